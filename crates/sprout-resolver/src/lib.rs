//! Dependency resolution for Sprout
//!
//! This crate decides how each declared dependency is fetched (the
//! resolution policy) and expands a root manifest into the full transitive
//! set of packages (discovery).

pub mod discovery;
pub mod policy;

// Re-export main types
pub use discovery::{Discoverer, Discovery, DiscoverySet, ResolutionCommentLog};
pub use policy::{is_simple_token, resolve};

use sprout_core::error::SproutError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, SproutError>;
