//! Concurrent package materialization
//!
//! Every resolved package gets `<packages_dir>/<name>`. Packages are
//! fetched concurrently and independently: one failing package is logged,
//! counted in the [`FetchReport`] and never stops its siblings.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use futures::stream::{self, StreamExt};
use sprout_config::FetchStrategy;
use sprout_core::error::SproutError;
use sprout_core::types::{FetchMode, Package};
use sprout_registry::PackageSource;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::archive::inflate_archive;
use crate::directory::prepare_package_dir;
use crate::progress::{ProgressFormat, ProgressMonitor};
use crate::scm::{ProviderRegistry, GIT_PROVIDER};
use crate::FetchResult;

/// Per-batch outcome counts, by package name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub fetched: Vec<String>,
    /// Already present and left alone
    pub skipped: Vec<String>,
    /// Package name and failure message
    pub failed: Vec<(String, String)>,
}

impl FetchReport {
    pub fn total(&self) -> usize {
        self.fetched.len() + self.skipped.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

enum PackageFetch {
    Fetched,
    Skipped,
}

/// Writes resolved packages to disk
pub struct Materializer {
    source: Arc<dyn PackageSource>,
    providers: ProviderRegistry,
    strategy: FetchStrategy,
    max_concurrent_fetches: Option<usize>,
    cancel: CancellationToken,
}

impl Materializer {
    pub fn new(source: Arc<dyn PackageSource>, providers: ProviderRegistry, strategy: FetchStrategy) -> Self {
        Self {
            source,
            providers,
            strategy,
            max_concurrent_fetches: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Cap in-flight package fetches; `None` fetches all packages at once
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }

    /// Stop clone fetches that are in flight and fail the ones not yet started
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Materialize every resolved package of `packages` under `packages_dir`
    pub async fn fetch_all<'a, I>(
        &self,
        packages_dir: &Utf8Path,
        packages: I,
        mode: FetchMode,
        progress: &dyn ProgressMonitor,
    ) -> FetchReport
    where
        I: IntoIterator<Item = &'a Package>,
    {
        let packages: Vec<Package> = packages.into_iter().filter(|p| p.is_resolved()).cloned().collect();
        let total = packages.len();
        let limit = self.max_concurrent_fetches.unwrap_or(total).max(1);

        info!(
            "Fetching {} packages into {} ({}, {})",
            total, packages_dir, self.strategy, mode
        );
        progress.start("Fetching packages", total, ProgressFormat::NOfM);

        let mut results = stream::iter(packages)
            .map(|package| async move {
                let result = self.fetch_one(packages_dir, &package, mode).await;
                (package, result)
            })
            .buffer_unordered(limit);

        let mut report = FetchReport::default();
        while let Some((package, result)) = results.next().await {
            match result {
                Ok(PackageFetch::Fetched) => {
                    debug!("Fetched {} ({})", package.name, package.spec());
                    report.fetched.push(package.name.clone());
                },
                Ok(PackageFetch::Skipped) => {
                    debug!("Skipped {}, already present", package.name);
                    report.skipped.push(package.name.clone());
                },
                Err(e) => {
                    warn!("Failed to fetch {} ({}): {}", package.name, package.spec(), e);
                    report.failed.push((package.name.clone(), e.to_string()));
                },
            }
            progress.worked(1);
        }
        progress.done();

        info!(
            "Fetched {}, skipped {}, failed {}",
            report.fetched.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    async fn fetch_one(
        &self,
        packages_dir: &Utf8Path,
        package: &Package,
        mode: FetchMode,
    ) -> FetchResult<PackageFetch> {
        let dir = package_dir(packages_dir, &package.name)?;
        let state = prepare_package_dir(&dir, mode).await?;
        if !state.needs_fetch(mode) {
            return Ok(PackageFetch::Skipped);
        }

        let result = match self.strategy {
            FetchStrategy::Zip => self.fetch_zip(package, &dir).await,
            FetchStrategy::Clone => self.fetch_clone(package, &dir).await,
        };

        if result.is_err() {
            // an incomplete directory would be skipped by the next install
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                debug!("Could not remove incomplete {}: {}", dir, e);
            }
        }
        result.map(|_| PackageFetch::Fetched)
    }

    async fn fetch_zip(&self, package: &Package, dir: &Utf8Path) -> FetchResult<()> {
        let bytes = self.source.download_archive(package).await?;
        let dest = dir.to_path_buf();
        let entry = package.spec();

        tokio::task::spawn_blocking(move || inflate_archive(&bytes, &dest))
            .await
            .map_err(|e| SproutError::ArchiveWriteFailure {
                entry,
                message: format!("inflation task failed: {}", e),
            })??;
        Ok(())
    }

    async fn fetch_clone(&self, package: &Package, dir: &Utf8Path) -> FetchResult<()> {
        let url = self.source.clone_url(package);
        let provider = self.providers.get(GIT_PROVIDER).ok_or_else(|| SproutError::CloneFailure {
            url: url.clone(),
            reason: format!("no '{}' provider registered", GIT_PROVIDER),
        })?;

        let branch = package.branch.clone();
        let dest = dir.to_path_buf();
        let cancel = self.cancel.clone();
        let task_url = url.clone();

        tokio::task::spawn_blocking(move || provider.clone_branch(&task_url, &branch, &dest, &cancel))
            .await
            .map_err(|e| SproutError::CloneFailure {
                url,
                reason: format!("clone task failed: {}", e),
            })?
    }
}

/// `<packages_dir>/<name>`, refusing names that are not a single path component
fn package_dir(packages_dir: &Utf8Path, name: &str) -> FetchResult<Utf8PathBuf> {
    let mut components = Utf8Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(camino::Utf8Component::Normal(part)), None) if part == name => Ok(packages_dir.join(name)),
        _ => Err(SproutError::DirectoryCreationFailure {
            path: packages_dir.join(name).to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "package name is not a plain directory name",
            ),
        }),
    }
}
