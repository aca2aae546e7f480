//! Remote package source client for Sprout
//!
//! This crate provides the network side of fetching: reading a package's own
//! manifest while discovering dependencies, and downloading branch archives
//! while materializing them. Both go through the [`PackageSource`] trait so
//! the engine can run against HTTP hosts or in-memory fixtures.

pub mod client;
pub mod source;

// Re-export main types
pub use client::{RetryConfig, SourceClient};
pub use source::{MemorySource, PackageSource};

use sprout_core::error::SproutError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, SproutError>;
