//! Source-control providers
//!
//! The clone strategy looks a provider up by id in a [`ProviderRegistry`]
//! that is built by the caller and passed in, so tests can register fakes.

use std::sync::Arc;

use camino::Utf8Path;
use git2::build::RepoBuilder;
use git2::{ErrorClass, FetchOptions, RemoteCallbacks};
use sprout_core::error::SproutError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::FetchResult;

/// Id of the built-in git provider
pub const GIT_PROVIDER: &str = "git";

/// Something that can check out one branch of a remote repository
pub trait ScmProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Clone `branch` of `url` into `dest`, an existing empty directory.
    ///
    /// Blocking; callers run it off the async runtime.
    fn clone_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Utf8Path,
        cancel: &CancellationToken,
    ) -> FetchResult<()>;
}

/// Providers available to the clone strategy
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ScmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the git provider
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GitProvider::new()));
        registry
    }

    /// Add a provider, replacing any with the same id
    pub fn register(&mut self, provider: Arc<dyn ScmProvider>) {
        self.providers.retain(|p| p.id() != provider.id());
        self.providers.push(provider);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ScmProvider>> {
        self.providers.iter().find(|p| p.id() == id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry").field("providers", &self.ids()).finish()
    }
}

/// libgit2-backed provider, fetching only the tip of the branch
#[derive(Debug, Clone, Copy, Default)]
pub struct GitProvider;

impl GitProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ScmProvider for GitProvider {
    fn id(&self) -> &str {
        GIT_PROVIDER
    }

    fn clone_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Utf8Path,
        cancel: &CancellationToken,
    ) -> FetchResult<()> {
        if cancel.is_cancelled() {
            return Err(SproutError::Cancelled {
                operation: format!("clone of {}", url),
            });
        }

        let mut callbacks = RemoteCallbacks::new();
        let token = cancel.clone();
        // returning false aborts the transfer
        callbacks.transfer_progress(move |_| !token.is_cancelled());

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        // local transports do not support shallow fetches
        let is_local = url.starts_with("file://") || Utf8Path::new(url).is_absolute();
        if !is_local {
            fetch_options.depth(1);
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        if !branch.is_empty() {
            builder.branch(branch);
        }

        debug!("Cloning {}#{} into {}", url, branch, dest);
        builder.clone(url, dest.as_std_path()).map_err(|e| {
            if cancel.is_cancelled() {
                SproutError::Cancelled {
                    operation: format!("clone of {}", url),
                }
            } else {
                SproutError::CloneFailure {
                    url: url.to_string(),
                    reason: interpret_git_error(&e),
                }
            }
        })?;

        Ok(())
    }
}

fn interpret_git_error(err: &git2::Error) -> String {
    let message = err.message().to_lowercase();

    if message.contains("not found") || message.contains("404") {
        "repository or branch not found".to_string()
    } else if message.contains("authentication") || message.contains("credentials") {
        "authentication failed".to_string()
    } else if message.contains("timed out") || message.contains("connection") {
        format!("network error: {}", err.message())
    } else if err.class() == ErrorClass::Http {
        format!("HTTP error: {}", err.message())
    } else {
        err.message().to_string()
    }
}

#[cfg(test)]
mod tests;
