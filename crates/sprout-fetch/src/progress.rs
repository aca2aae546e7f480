//! Progress reporting contract
//!
//! The engine calls `start` once per batch and `worked` once per finished
//! package, whether it succeeded or not. Rendering is up to the implementor.

/// How a progress total should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressFormat {
    /// "N of M"
    NOfM,
    /// No meaningful total
    Indeterminate,
}

/// Receiver of batch progress
pub trait ProgressMonitor: Send + Sync {
    fn start(&self, label: &str, total: usize, format: ProgressFormat);

    fn worked(&self, units: usize);

    /// Called once the batch is over
    fn done(&self) {}
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressMonitor for NullProgress {
    fn start(&self, _label: &str, _total: usize, _format: ProgressFormat) {}

    fn worked(&self, _units: usize) {}
}
