//! Utility functions and helpers.
//!
//! Common functionality used across multiple Sprout crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{is_safe_path, relative_to, safe_join, strip_wrapper};
