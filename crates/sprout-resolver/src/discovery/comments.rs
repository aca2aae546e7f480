//! Human-readable notes about how declarations were resolved

use indexmap::IndexSet;
use sprout_core::types::{Package, ResolutionOutcome};
use tracing::{info, warn};

/// Altered, ignored and unresolved declarations of one discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionCommentLog {
    pub altered: IndexSet<String>,
    pub ignored: IndexSet<String>,
    pub unresolved: IndexSet<String>,
}

impl ResolutionCommentLog {
    /// Note a package that was not used exactly as declared
    pub fn record(&mut self, package: &Package) {
        match package.resolution {
            ResolutionOutcome::Resolved(reason) if package.resolution.is_altered() => {
                self.altered.insert(format!(
                    "{}: '{}' -> '{}' ({})",
                    package.name,
                    package.declared,
                    package.spec(),
                    reason.describe()
                ));
            },
            ResolutionOutcome::Resolved(_) => {},
            ResolutionOutcome::Ignored(reason) => {
                self.ignored
                    .insert(format!("{} ({})", package.name, reason.describe()));
            },
            ResolutionOutcome::Unresolved(reason) => {
                self.unresolved.insert(format!(
                    "{}: '{}' ({})",
                    package.name,
                    package.declared,
                    reason.describe()
                ));
            },
        }
    }

    /// Note a declaration dropped because `kept` already claimed its name
    pub fn record_conflict(&mut self, kept: &Package, dropped: &Package) {
        self.altered.insert(format!(
            "{}: '{}' -> '{}' (pinned to first declared source)",
            dropped.name,
            dropped.declared,
            kept.spec()
        ));
    }

    pub fn is_empty(&self) -> bool {
        self.altered.is_empty() && self.ignored.is_empty() && self.unresolved.is_empty()
    }

    /// Log every entry; unresolved dependencies are warnings, the rest informational
    pub fn emit(&self) {
        for line in &self.altered {
            info!("Altered dependency {}", line);
        }
        for line in &self.ignored {
            info!("Ignored dependency {}", line);
        }
        for line in &self.unresolved {
            warn!("Unresolved dependency {}", line);
        }
    }
}
