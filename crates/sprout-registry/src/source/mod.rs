//! The network capability used by discovery and materialization

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sprout_core::error::SproutError;
use sprout_core::types::Package;

use crate::RegistryResult;

/// Where package manifests and archives come from
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Read `manifest_file` at the root of the package's branch
    async fn fetch_manifest(&self, package: &Package, manifest_file: &str) -> RegistryResult<String>;

    /// Download the zip archive of the package's branch
    async fn download_archive(&self, package: &Package) -> RegistryResult<Vec<u8>>;

    /// Repository URL handed to source-control providers
    fn clone_url(&self, package: &Package) -> String;
}

/// In-memory source keyed by `path#branch`
#[derive(Debug, Default)]
pub struct MemorySource {
    manifests: RwLock<HashMap<String, String>>,
    archives: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the manifest served for `spec` (`path#branch`)
    pub fn with_manifest(self, spec: &str, text: &str) -> Self {
        self.manifests.write().insert(spec.to_string(), text.to_string());
        self
    }

    /// Register the archive served for `spec` (`path#branch`)
    pub fn with_archive(self, spec: &str, bytes: Vec<u8>) -> Self {
        self.archives.write().insert(spec.to_string(), bytes);
        self
    }
}

#[async_trait]
impl PackageSource for MemorySource {
    async fn fetch_manifest(&self, package: &Package, manifest_file: &str) -> RegistryResult<String> {
        self.manifests
            .read()
            .get(&package.spec())
            .cloned()
            .ok_or_else(|| SproutError::NetworkFetchFailure {
                message: format!("{} not found for {}", manifest_file, package.spec()),
                source: None,
            })
    }

    async fn download_archive(&self, package: &Package) -> RegistryResult<Vec<u8>> {
        self.archives
            .read()
            .get(&package.spec())
            .cloned()
            .ok_or_else(|| SproutError::NetworkFetchFailure {
                message: format!("archive not found for {}", package.spec()),
                source: None,
            })
    }

    fn clone_url(&self, package: &Package) -> String {
        format!("memory://{}", package.path)
    }
}
