//! Per-project metadata shared by the reference resolver and the builder

use std::sync::atomic::{AtomicBool, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;

use crate::builder::Diagnostic;

/// A project rooted at a directory that holds (or should hold) a manifest
#[derive(Debug)]
pub struct Project {
    root: Utf8PathBuf,
    self_reference: RwLock<Option<String>>,
    self_reference_computed: AtomicBool,
    diagnostics: RwLock<Vec<Diagnostic>>,
}

impl Project {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            self_reference: RwLock::new(None),
            self_reference_computed: AtomicBool::new(false),
            diagnostics: RwLock::new(Vec::new()),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The project's own declared package name, if known
    pub fn self_reference(&self) -> Option<String> {
        self.self_reference.read().clone()
    }

    pub fn set_self_reference(&self, name: Option<String>) {
        *self.self_reference.write() = name;
        self.self_reference_computed.store(true, Ordering::SeqCst);
    }

    /// Claim the one-time self reference computation; true for the first caller only
    pub(crate) fn claim_self_reference_computation(&self) -> bool {
        !self.self_reference_computed.swap(true, Ordering::SeqCst)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.read().clone()
    }

    pub fn set_diagnostics(&self, diagnostics: Vec<Diagnostic>) {
        *self.diagnostics.write() = diagnostics;
    }
}
