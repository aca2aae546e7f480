//! Manifest parsing and settings for Sprout
//!
//! This crate parses dependency manifests (`bower.json`, `pubspec.yaml`) and
//! the `sprout.toml` settings file, layering project, global, environment
//! and command-line sources into one [`Settings`] value.

pub mod manifest;
pub mod merge;
pub mod settings;

// Re-export main types
pub use manifest::{load_manifest, parse_manifest, Manifest, ManifestFormat};
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource};
pub use settings::{FetchStrategy, ResolutionSettings, Settings, SourceSettings, SproutToml};

use sprout_core::error::SproutError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, SproutError>;
