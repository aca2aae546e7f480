//! Dependency declaration types.
//!
//! A declaration is one `name -> location expression` entry of a manifest,
//! before any policy has been applied to it.

use serde::{Deserialize, Serialize};

/// One manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    pub name: String,
    pub location_expr: String,
    pub kind: DependencyKind,
}

/// Manifest section a declaration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// `dependencies`
    Normal,
    /// `dev_dependencies` / `devDependencies`
    Dev,
}

impl DependencyDeclaration {
    /// Create a new normal dependency declaration
    pub fn new(name: impl Into<String>, location_expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location_expr: location_expr.into(),
            kind: DependencyKind::Normal,
        }
    }

    /// Create a development dependency declaration
    pub fn dev(name: impl Into<String>, location_expr: impl Into<String>) -> Self {
        Self {
            kind: DependencyKind::Dev,
            ..Self::new(name, location_expr)
        }
    }

    /// Whether the expression asks for the configured mapping (`"*"`)
    pub fn is_star(&self) -> bool {
        self.location_expr == "*"
    }
}
