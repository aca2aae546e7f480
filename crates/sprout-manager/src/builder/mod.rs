//! Change-triggered project metadata updates
//!
//! When a batch of file changes touches the manifest or anything under the
//! packages directory, the builder re-reads the manifest and refreshes the
//! project's self reference and diagnostics.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::layout::PackageLayout;
use crate::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

/// One filesystem change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: Utf8PathBuf,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// Problem attached to a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Dependency the diagnostic is about
    pub dependency: Option<String>,
}

impl ChangeRecord {
    pub fn new(path: impl Into<Utf8PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

/// Refreshes project metadata after file changes
#[derive(Debug, Clone, Copy)]
pub struct PackageBuilder {
    layout: PackageLayout,
}

impl PackageBuilder {
    pub fn new(layout: PackageLayout) -> Self {
        Self { layout }
    }

    /// Whether `change` can affect the project's dependency metadata
    pub fn is_relevant(&self, root: &Utf8Path, change: &ChangeRecord) -> bool {
        change.path == self.layout.manifest_path(root)
            || change.path.starts_with(self.layout.packages_path(root))
    }

    /// Process a batch of changes; returns whether the project was refreshed
    pub fn build(&self, project: &Project, changes: &[ChangeRecord]) -> bool {
        let root = project.root();
        if !changes.iter().any(|c| self.is_relevant(root, c)) {
            return false;
        }

        let manifest_path = self.layout.manifest_path(root);
        let manifest_removed = changes
            .iter()
            .any(|c| c.path == manifest_path && c.kind == ChangeKind::Removed);
        if manifest_removed {
            debug!("{} removed, clearing project metadata", manifest_path);
            project.set_self_reference(None);
            project.set_diagnostics(Vec::new());
            return true;
        }

        self.refresh(project);
        true
    }

    /// Re-read the manifest and recompute self reference and diagnostics
    pub fn refresh(&self, project: &Project) {
        let root = project.root();
        let manifest = match self.layout.read_manifest(root) {
            Ok(Some(manifest)) => manifest,
            Ok(None) => {
                project.set_self_reference(None);
                project.set_diagnostics(Vec::new());
                return;
            },
            Err(e) => {
                warn!("{}", e);
                project.set_self_reference(None);
                project.set_diagnostics(vec![Diagnostic {
                    severity: Severity::Error,
                    message: e.to_string(),
                    dependency: None,
                }]);
                return;
            },
        };

        let packages = self.layout.packages_path(root);
        let diagnostics: Vec<Diagnostic> = manifest
            .dependency_names()
            .filter(|name| !packages.join(name).is_dir())
            .map(|name| Diagnostic {
                severity: Severity::Warning,
                message: format!(
                    "Dependency '{}' is not installed in {}",
                    name, self.layout.packages_dir
                ),
                dependency: Some(name.to_string()),
            })
            .collect();

        debug!(
            "Refreshed {}: self reference '{}', {} diagnostics",
            root,
            manifest.name,
            diagnostics.len()
        );
        project.set_self_reference(Some(manifest.name));
        project.set_diagnostics(diagnostics);
    }
}
