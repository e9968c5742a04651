//! Error types for procctl.
//!
//! The public process actions never return these: quit, force-quit and
//! restart absorb failures and log them. The errors exist for the OS
//! primitives underneath and for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the procctl library.
#[derive(Debug, Error)]
pub enum ProcctlError {
    // Process errors
    #[error("Failed to send {signal} to process {pid}: {message}")]
    Signal {
        pid: u32,
        signal: String,
        message: String,
    },

    #[error("Process not found: {0}")]
    ProcessNotFound(u32),

    #[error("Launch failed for {target}: {message}")]
    LaunchFailed { target: String, message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("No async runtime available: {0}")]
    Runtime(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for procctl operations.
pub type Result<T> = std::result::Result<T, ProcctlError>;

impl From<std::io::Error> for ProcctlError {
    fn from(err: std::io::Error) -> Self {
        ProcctlError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ProcctlError {
    fn from(err: serde_json::Error) -> Self {
        ProcctlError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl ProcctlError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ProcctlError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Whether the error only means the target process is already gone.
    ///
    /// Callers treat this as success for termination requests.
    pub fn is_process_gone(&self) -> bool {
        matches!(self, ProcctlError::ProcessNotFound(_))
    }
}
