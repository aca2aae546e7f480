//! Package manager back-ends for Sprout
//!
//! This crate puts the engine behind one [`PackageManager`] contract with two
//! back-ends: [`BowerManager`] discovers and fetches packages itself, while
//! [`PubManager`] delegates to the external `pub` tool. It also owns the
//! on-disk layout both back-ends agree on, and the two consumers of that
//! layout: the [`ReferenceResolver`] and the change-triggered
//! [`PackageBuilder`].

pub mod builder;
pub mod layout;
pub mod manager;
pub mod project;
pub mod reference;

// Re-export main types
pub use builder::{ChangeKind, ChangeRecord, Diagnostic, PackageBuilder, Severity};
pub use layout::{Ecosystem, PackageLayout, BOWER_LAYOUT, PUB_LAYOUT};
pub use manager::{
    create_manager, BowerManager, InstallOptions, InstallState, InstallSummary, PackageManager,
    PubManager,
};
pub use project::Project;
pub use reference::ReferenceResolver;

use sprout_core::error::SproutError;

/// Result type for package manager operations
pub type ManagerResult<T> = Result<T, SproutError>;
