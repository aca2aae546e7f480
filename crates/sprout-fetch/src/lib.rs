//! Package directory materialization for Sprout
//!
//! This crate turns resolved packages into directories under a project's
//! packages directory. It decides per package whether to skip, create or
//! clean the destination, then fills it either by inflating the branch
//! archive or by cloning the branch through a source-control provider.

pub mod archive;
pub mod directory;
pub mod materializer;
pub mod progress;
pub mod scm;

// Re-export main types
pub use archive::{inflate_archive, InflateStats};
pub use directory::{prepare_package_dir, PackageDirectoryState};
pub use materializer::{FetchReport, Materializer};
pub use progress::{NullProgress, ProgressFormat, ProgressMonitor};
pub use scm::{GitProvider, ProviderRegistry, ScmProvider};
pub use tokio_util::sync::CancellationToken;

use sprout_core::error::SproutError;

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, SproutError>;
