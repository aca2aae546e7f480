//! Transitive dependency discovery
//!
//! Discovery expands a root manifest level by level. The coordinator owns the
//! [`DiscoverySet`]; fetch tasks only return the manifests they read, so the
//! set is never touched concurrently. Within a level, results are merged in
//! declaration order, which keeps first-seen-wins deterministic. A later
//! declaration asking for a different source of a known name is dropped and
//! noted in the comment log.
//!
//! A level only starts once every manifest of the previous level is read, so
//! a slow sibling delays the next level. That wait is what makes the winner
//! of a name collision independent of network timing.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use sprout_config::{parse_manifest, Manifest, ManifestFormat, ResolutionSettings};
use sprout_core::types::{DependencyDeclaration, Package};
use sprout_registry::PackageSource;
use tracing::{debug, info, warn};

use crate::policy;
use crate::ResolverResult;

mod comments;

pub use comments::ResolutionCommentLog;

/// Packages of one discovery run, by name
pub type DiscoverySet = IndexMap<String, Package>;

/// Result of one discovery run
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub packages: DiscoverySet,
    pub comments: ResolutionCommentLog,
}

/// Recursive manifest walker
pub struct Discoverer {
    source: Arc<dyn PackageSource>,
    settings: ResolutionSettings,
    manifest_file: String,
    format: ManifestFormat,
    max_concurrent_fetches: Option<usize>,
}

impl Discovery {
    /// Packages that will be materialized
    pub fn resolved(&self) -> impl Iterator<Item = &Package> {
        self.packages.values().filter(|p| p.is_resolved())
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved().count()
    }
}

impl Discoverer {
    /// Create a discoverer reading `manifest_file` from every package
    pub fn new(
        source: Arc<dyn PackageSource>,
        settings: ResolutionSettings,
        manifest_file: impl Into<String>,
    ) -> Self {
        let manifest_file = manifest_file.into();
        let format = ManifestFormat::from_file_name(&manifest_file);
        Self {
            source,
            settings,
            manifest_file,
            format,
            max_concurrent_fetches: None,
        }
    }

    /// Cap in-flight manifest fetches per level; `None` leaves them unbounded
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }

    /// Discover the transitive package set of a root manifest.
    ///
    /// Only a root manifest that cannot be parsed fails the run; every
    /// sub-package failure is logged and skipped.
    pub async fn discover(&self, root_text: &str, root_description: &str) -> ResolverResult<Discovery> {
        let root = parse_manifest(root_text, self.format, root_description)?;
        info!("Discovering dependencies of {} ({})", root.name, root_description);

        let mut discovery = Discovery::default();
        let mut frontier = self.admit(&mut discovery, root.all_declarations());
        let mut depth = 0;

        while !frontier.is_empty() {
            depth += 1;
            debug!("Discovery level {}: {} manifests to read", depth, frontier.len());

            let mut next = Vec::new();
            for (package, result) in self.fetch_level(frontier).await {
                match result {
                    Ok(manifest) => {
                        next.extend(self.admit(&mut discovery, manifest.runtime_declarations()));
                    },
                    Err(e) => {
                        warn!("Skipping dependencies of {} ({}): {}", package.name, package.spec(), e);
                    },
                }
            }
            frontier = next;
        }

        info!(
            "Discovered {} packages ({} resolved)",
            discovery.packages.len(),
            discovery.resolved_count()
        );
        discovery.comments.emit();
        Ok(discovery)
    }

    /// Insert unseen declarations; returns the new packages whose manifests must be read
    fn admit(
        &self,
        discovery: &mut Discovery,
        declarations: Vec<DependencyDeclaration>,
    ) -> Vec<Package> {
        let mut admitted = Vec::new();

        for declaration in declarations {
            if let Some(existing) = discovery.packages.get(&declaration.name) {
                let duplicate = policy::resolve(&declaration, &self.settings);
                if existing.is_resolved() && duplicate.is_resolved() && !existing.same_source(&duplicate) {
                    warn!(
                        "{} is pinned to '{}', ignoring conflicting '{}'",
                        declaration.name,
                        existing.spec(),
                        duplicate.spec()
                    );
                    discovery.comments.record_conflict(existing, &duplicate);
                } else {
                    debug!(
                        "{} already discovered as '{}', ignoring '{}'",
                        declaration.name, existing.declared, declaration.location_expr
                    );
                }
                continue;
            }

            let package = policy::resolve(&declaration, &self.settings);
            discovery.comments.record(&package);
            if package.is_resolved() {
                admitted.push(package.clone());
            }
            discovery.packages.insert(package.name.clone(), package);
        }

        admitted
    }

    /// Read the manifests of one level concurrently, keeping input order
    async fn fetch_level(&self, frontier: Vec<Package>) -> Vec<(Package, ResolverResult<Manifest>)> {
        let limit = self.max_concurrent_fetches.unwrap_or(frontier.len()).max(1);

        stream::iter(frontier)
            .map(|package| async move {
                let result = self.fetch_manifest(&package).await;
                (package, result)
            })
            .buffered(limit)
            .collect()
            .await
    }

    async fn fetch_manifest(&self, package: &Package) -> ResolverResult<Manifest> {
        let text = self.source.fetch_manifest(package, &self.manifest_file).await?;
        parse_manifest(&text, self.format, &package.spec())
    }
}

#[cfg(test)]
mod tests;
