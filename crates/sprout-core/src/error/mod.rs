//! Error types and result aliases for Sprout operations.
//!
//! Provides a unified error type that covers every failure the fetch engine
//! can report, with actionable messages for the CLI.

use thiserror::Error;

/// Unified error type for all Sprout operations
#[derive(Error, Debug)]
pub enum SproutError {
    // Manifest errors
    #[error("Malformed manifest {origin}: {message}")]
    MalformedManifest { origin: String, message: String },

    // Resolution errors
    #[error("Dependency '{name}' could not be resolved: {reason}")]
    UnresolvedDependency { name: String, reason: String },

    #[error("None of the {declared} declared dependencies could be resolved")]
    NoResolvableDependencies { declared: usize },

    // Config errors
    #[error("Failed to parse {file}: {message}")]
    ConfigParse { file: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Fetch errors
    #[error("Failed to create directory {path}")]
    DirectoryCreationFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Network fetch failed: {message}")]
    NetworkFetchFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to write archive entry {entry}: {message}")]
    ArchiveWriteFailure { entry: String, message: String },

    #[error("Failed to clone {url}: {reason}")]
    CloneFailure { url: String, reason: String },

    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    // Manager errors
    #[error("`{command}` exited with {status}: {stderr}")]
    ExternalTool {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Precondition violated: {message}")]
    PreconditionViolation { message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Sprout operations
pub type SproutResult<T> = Result<T, SproutError>;

impl SproutError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::NetworkFetchFailure {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a malformed manifest error
    pub fn malformed(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedManifest {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SproutError::NetworkFetchFailure { .. }
                | SproutError::CloneFailure { .. }
                | SproutError::Io { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SproutError::MalformedManifest { .. } => {
                Some("Check the manifest syntax and make sure it declares a 'name'")
            },
            SproutError::NetworkFetchFailure { .. } => {
                Some("Check your internet connection and try again")
            },
            SproutError::NoResolvableDependencies { .. } => {
                Some("Add entries to overridden-dependencies in sprout.toml or enable map-complex-version-to-latest-stable")
            },
            SproutError::ExternalTool { .. } => {
                Some("Make sure the package tool is installed and on your PATH")
            },
            SproutError::PreconditionViolation { .. } => {
                Some("Run the command from a directory that contains the manifest")
            },
            _ => None,
        }
    }
}
