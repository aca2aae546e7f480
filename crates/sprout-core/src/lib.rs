//! # sprout-core
//!
//! Core types and utilities shared across all Sprout crates.
//!
//! This crate provides:
//! - Dependency declarations as read from a manifest
//! - Packages and their resolution outcomes
//! - SproutError enum for unified error handling
//! - Path helpers used when writing package contents to disk
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (DependencyDeclaration, Package, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{SproutError, SproutResult};
pub use types::{
    DependencyDeclaration, DependencyKind, FetchMode, IgnoredReason, Package, ResolutionOutcome,
    ResolvedReason, UnresolvedReason, STABLE_BRANCH,
};
