//! The package manager contract and its back-ends

use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use sprout_config::{load_manifest, Settings};
use sprout_core::error::SproutError;
use sprout_core::types::FetchMode;
use sprout_fetch::{FetchReport, ProgressMonitor};
use sprout_resolver::ResolutionCommentLog;

use crate::builder::PackageBuilder;
use crate::layout::{Ecosystem, PackageLayout};
use crate::project::Project;
use crate::reference::ReferenceResolver;
use crate::ManagerResult;

mod bower;
mod pub_tool;

pub use bower::BowerManager;
pub use pub_tool::PubManager;

/// Result of a cheap installation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    Installed,
    /// First declared dependency without a directory entry
    Missing(String),
}

/// Knobs for install and upgrade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Fail with `NoResolvableDependencies` when declarations exist but none resolved
    pub require_resolved: bool,
}

/// Aggregate outcome of one install or upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    pub mode: FetchMode,
    /// Packages seen during discovery, resolved or not
    pub discovered: usize,
    pub resolved: usize,
    pub report: FetchReport,
    pub comments: ResolutionCommentLog,
}

impl InstallSummary {
    pub fn empty(mode: FetchMode) -> Self {
        Self {
            mode,
            discovered: 0,
            resolved: 0,
            report: FetchReport::default(),
            comments: ResolutionCommentLog::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }
}

/// Contract shared by every ecosystem back-end
#[async_trait]
pub trait PackageManager: Send + Sync {
    fn layout(&self) -> &PackageLayout;

    /// Change-triggered metadata updater for projects of this ecosystem
    fn builder(&self) -> PackageBuilder {
        PackageBuilder::new(*self.layout())
    }

    fn resolver_for(&self, project: Arc<Project>) -> ReferenceResolver {
        ReferenceResolver::new(project, *self.layout())
    }

    /// Fetch missing packages. The manifest must exist directly under `root`.
    async fn install_packages(
        &self,
        root: &Utf8Path,
        progress: &dyn ProgressMonitor,
    ) -> ManagerResult<InstallSummary>;

    /// Re-fetch every package. The manifest must exist directly under `root`.
    async fn upgrade_packages(
        &self,
        root: &Utf8Path,
        progress: &dyn ProgressMonitor,
    ) -> ManagerResult<InstallSummary>;

    /// Stop fetches in flight; the pending install reports them as failed
    fn cancel(&self) {}

    /// Check that every declared dependency has a directory entry; not transitive
    async fn are_packages_installed(&self, root: &Utf8Path) -> ManagerResult<InstallState> {
        let manifest_path = require_manifest(self.layout(), root)?;
        let manifest = load_manifest(&manifest_path).await?;
        let packages = self.layout().packages_path(root);

        for name in manifest.dependency_names() {
            if tokio::fs::symlink_metadata(packages.join(name)).await.is_err() {
                return Ok(InstallState::Missing(name.to_string()));
            }
        }
        Ok(InstallState::Installed)
    }
}

/// Build the back-end for `ecosystem`
pub fn create_manager(ecosystem: Ecosystem, settings: &Settings) -> ManagerResult<Box<dyn PackageManager>> {
    Ok(match ecosystem {
        Ecosystem::Bower => Box::new(BowerManager::from_settings(settings)?),
        Ecosystem::Pub => Box::new(PubManager::from_settings(settings)),
    })
}

/// Path of the manifest under `root`; its absence is a caller error
pub(crate) fn require_manifest(layout: &PackageLayout, root: &Utf8Path) -> ManagerResult<Utf8PathBuf> {
    let path = layout.manifest_path(root);
    if !path.is_file() {
        return Err(SproutError::PreconditionViolation {
            message: format!("{} not found in {}", layout.manifest_file, root),
        });
    }
    Ok(path)
}
