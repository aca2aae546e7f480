//! Terminal output formatting and utilities.
//!
//! Consistent output across commands: colored status lines, a progress bar
//! fed by the fetch engine, and error messages with suggestions.

pub mod colors;
pub mod errors;
pub mod progress;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.colors.red("✗"), message);
    }

    /// Print a step message with emoji
    pub fn step(&self, emoji: &str, message: &str) {
        println!("{} {}", emoji, self.colors.dim(message));
    }

    /// Progress bar drawing to stderr when it is a terminal
    pub fn progress(&self) -> progress::ProgressBar {
        progress::ProgressBar::detect()
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
