//! Package and resolution outcome types.
//!
//! A [`Package`] is what the resolution policy makes of one declaration. Only
//! packages whose outcome is [`ResolutionOutcome::Resolved`] are fetched.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DependencyKind;

/// Branch used when a declaration names none, or when a complex version is
/// mapped to the latest stable code.
pub const STABLE_BRANCH: &str = "master";

/// A declared dependency after policy evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    /// Source path, e.g. `foo/left-pad`. Empty when it could not be determined.
    pub path: String,
    /// Branch or version token to fetch. Empty when it could not be determined.
    pub branch: String,
    /// The expression as written in the manifest
    pub declared: String,
    pub kind: DependencyKind,
    pub resolution: ResolutionOutcome,
}

/// Why a declaration resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolvedReason {
    UsedAsIs,
    StarPathMapped,
    PathOverridden,
    ComplexVersionDefaulted,
}

/// Why a declaration could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnresolvedReason {
    MalformedSpec,
    StarPathUnmapped,
    ComplexVersionUnsupported,
}

/// Why a declaration was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IgnoredReason {
    PerConfigDirective,
}

/// Outcome of applying the resolution policy to one declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    Resolved(ResolvedReason),
    Unresolved(UnresolvedReason),
    Ignored(IgnoredReason),
}

/// Directory preparation policy for materialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchMode {
    /// Leave existing package directories untouched
    Install,
    /// Remove and re-fetch existing package directories
    Upgrade,
}

impl Package {
    /// Whether this package proceeds to materialization
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_resolved()
    }

    /// Two packages conflict when they share a name but not a source
    pub fn same_source(&self, other: &Package) -> bool {
        self.path == other.path && self.branch == other.branch
    }

    /// `path#branch` as it will be fetched
    pub fn spec(&self) -> String {
        if self.branch.is_empty() {
            self.path.clone()
        } else {
            format!("{}#{}", self.path, self.branch)
        }
    }
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }

    /// Resolved, but not exactly as declared
    pub fn is_altered(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(reason) if *reason != ResolvedReason::UsedAsIs)
    }
}

impl ResolvedReason {
    pub fn describe(&self) -> &'static str {
        match self {
            ResolvedReason::UsedAsIs => "used as declared",
            ResolvedReason::StarPathMapped => "'*' mapped through overridden-dependencies",
            ResolvedReason::PathOverridden => "overridden by overridden-dependencies",
            ResolvedReason::ComplexVersionDefaulted => "complex version mapped to latest stable",
        }
    }
}

impl UnresolvedReason {
    pub fn describe(&self) -> &'static str {
        match self {
            UnresolvedReason::MalformedSpec => "malformed location expression",
            UnresolvedReason::StarPathUnmapped => {
                "'*' has no entry in overridden-dependencies"
            },
            UnresolvedReason::ComplexVersionUnsupported => {
                "complex versions are not supported; enable map-complex-version-to-latest-stable"
            },
        }
    }
}

impl IgnoredReason {
    pub fn describe(&self) -> &'static str {
        match self {
            IgnoredReason::PerConfigDirective => "listed in ignored-dependencies",
        }
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionOutcome::Resolved(r) => write!(f, "resolved ({})", r.describe()),
            ResolutionOutcome::Unresolved(r) => write!(f, "unresolved ({})", r.describe()),
            ResolutionOutcome::Ignored(r) => write!(f, "ignored ({})", r.describe()),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Install => f.write_str("install"),
            FetchMode::Upgrade => f.write_str("upgrade"),
        }
    }
}
