//! Back-end that discovers and fetches packages itself

use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8Path;
use sprout_config::{ResolutionSettings, Settings};
use sprout_core::error::SproutError;
use sprout_core::types::FetchMode;
use sprout_fetch::{Materializer, ProgressMonitor, ProviderRegistry};
use sprout_registry::{PackageSource, SourceClient};
use sprout_resolver::{Discoverer, Discovery};
use tracing::info;

use super::{require_manifest, InstallOptions, InstallSummary, PackageManager};
use crate::layout::{PackageLayout, BOWER_LAYOUT};
use crate::ManagerResult;

/// Discoverer + Materializer pipeline over `bower.json`
pub struct BowerManager {
    layout: PackageLayout,
    source: Arc<dyn PackageSource>,
    resolution: ResolutionSettings,
    max_concurrent_fetches: Option<usize>,
    materializer: Materializer,
    options: InstallOptions,
}

impl BowerManager {
    pub fn new(source: Arc<dyn PackageSource>, settings: &Settings) -> Self {
        let materializer = Materializer::new(source.clone(), ProviderRegistry::with_defaults(), settings.fetch_strategy)
            .with_concurrency_limit(settings.max_concurrent_fetches);

        Self {
            layout: BOWER_LAYOUT,
            source,
            resolution: settings.resolution.clone(),
            max_concurrent_fetches: settings.max_concurrent_fetches,
            materializer,
            options: InstallOptions::default(),
        }
    }

    /// Manager talking to the hosts configured in `settings`
    pub fn from_settings(settings: &Settings) -> ManagerResult<Self> {
        let client = SourceClient::new(&settings.source)?;
        Ok(Self::new(Arc::new(client), settings))
    }

    pub fn with_options(mut self, options: InstallOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve the transitive package set of the project at `root` without fetching
    pub async fn discover(&self, root: &Utf8Path) -> ManagerResult<Discovery> {
        let manifest_path = require_manifest(&self.layout, root)?;
        let text = tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|e| SproutError::io(format!("Failed to read {}", manifest_path), e))?;

        Discoverer::new(self.source.clone(), self.resolution.clone(), self.layout.manifest_file)
            .with_concurrency_limit(self.max_concurrent_fetches)
            .discover(&text, manifest_path.as_str())
            .await
    }

    async fn run(
        &self,
        root: &Utf8Path,
        mode: FetchMode,
        progress: &dyn ProgressMonitor,
    ) -> ManagerResult<InstallSummary> {
        let discovery = self.discover(root).await?;
        let discovered = discovery.packages.len();
        let resolved = discovery.resolved_count();

        if self.options.require_resolved && discovered > 0 && resolved == 0 {
            return Err(SproutError::NoResolvableDependencies {
                declared: discovered,
            });
        }

        let packages_dir = self.layout.packages_path(root);
        tokio::fs::create_dir_all(&packages_dir)
            .await
            .map_err(|source| SproutError::DirectoryCreationFailure {
                path: packages_dir.to_string(),
                source,
            })?;

        let report = self
            .materializer
            .fetch_all(&packages_dir, discovery.resolved(), mode, progress)
            .await;

        info!(
            "{} of {}: {} packages discovered, {} resolved, {} fetched",
            mode,
            root,
            discovered,
            resolved,
            report.fetched.len()
        );

        Ok(InstallSummary {
            mode,
            discovered,
            resolved,
            report,
            comments: discovery.comments,
        })
    }
}

#[async_trait]
impl PackageManager for BowerManager {
    fn layout(&self) -> &PackageLayout {
        &self.layout
    }

    async fn install_packages(
        &self,
        root: &Utf8Path,
        progress: &dyn ProgressMonitor,
    ) -> ManagerResult<InstallSummary> {
        self.run(root, FetchMode::Install, progress).await
    }

    async fn upgrade_packages(
        &self,
        root: &Utf8Path,
        progress: &dyn ProgressMonitor,
    ) -> ManagerResult<InstallSummary> {
        self.run(root, FetchMode::Upgrade, progress).await
    }

    fn cancel(&self) {
        self.materializer.cancel();
    }
}
