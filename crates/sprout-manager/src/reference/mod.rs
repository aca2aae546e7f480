//! Symbolic references to files in packages
//!
//! A reference is `<prefix><package>/<path>`, e.g. `package:args/args.dart`.
//! It points into `<packages_dir>/<package>/<path>`, except when `<package>`
//! is the project's own name and the layout has a source directory, in which
//! case it points into `<source_dir>/<path>`.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use sprout_core::utils::{is_safe_path, relative_to, safe_join};
use tracing::{debug, warn};

use crate::layout::PackageLayout;
use crate::project::Project;

/// Maps references to files and back for one project
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    project: Arc<Project>,
    layout: PackageLayout,
}

impl ReferenceResolver {
    /// Create a resolver, computing the project's self reference on first use
    pub fn new(project: Arc<Project>, layout: PackageLayout) -> Self {
        if project.claim_self_reference_computation() {
            let name = match layout.read_manifest(project.root()) {
                Ok(manifest) => manifest.map(|m| m.name),
                Err(e) => {
                    warn!("Cannot determine self reference of {}: {}", project.root(), e);
                    None
                },
            };
            debug!("Self reference of {}: {:?}", project.root(), name);
            project.set_self_reference(name);
        }

        Self { project, layout }
    }

    /// File a reference points to, if the prefix matches and the file exists
    pub fn resolve_to_location(&self, reference: &str) -> Option<Utf8PathBuf> {
        let rest = reference.strip_prefix(self.layout.reference_prefix)?;
        let (name, path) = rest.split_once('/')?;
        if name.is_empty() || name == "." || name == ".." || path.is_empty() {
            return None;
        }

        let path = Utf8Path::new(path);
        if !is_safe_path(path) {
            return None;
        }

        let root = self.project.root();
        let base = match (self.project.self_reference(), self.layout.source_path(root)) {
            (Some(self_name), Some(source)) if self_name == name => source,
            _ => self.layout.packages_path(root).join(name),
        };

        let target = safe_join(&base, path).ok()?;
        target.is_file().then_some(target)
    }

    /// Reference for a file inside the packages or source directory
    pub fn reference_for(&self, file: &Utf8Path) -> Option<String> {
        let parts = relative_to(self.project.root(), file)?;
        let (top, rest) = parts.split_first()?;

        if *top == self.layout.packages_dir {
            // <package>/<path...>
            if rest.len() < 2 {
                return None;
            }
            return Some(format!("{}{}", self.layout.reference_prefix, rest.join("/")));
        }

        if Some(*top) == self.layout.source_dir {
            let self_name = self.project.self_reference()?;
            if rest.is_empty() {
                return None;
            }
            return Some(format!(
                "{}{}/{}",
                self.layout.reference_prefix,
                self_name,
                rest.join("/")
            ));
        }

        None
    }
}

#[cfg(test)]
mod tests;
