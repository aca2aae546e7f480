//! Core data types for Sprout package fetching.
//!
//! This module provides the fundamental types used throughout Sprout:
//! - Dependency declarations read from manifests
//! - Packages with their resolution outcomes
//! - Fetch modes controlling directory preparation

pub mod dependency;
pub mod package;

// Re-export all public types
pub use dependency::{DependencyDeclaration, DependencyKind};
pub use package::{
    FetchMode, IgnoredReason, Package, ResolutionOutcome, ResolvedReason, UnresolvedReason,
    STABLE_BRANCH,
};
