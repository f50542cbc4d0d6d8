//! Unified error type for fs-recon.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all fs-recon operations.
#[derive(Error, Debug)]
pub enum ReconError {
    /// The orchestrator was asked to perform a transition its current
    /// state does not allow (e.g. `resume()` while running).
    #[error("Invalid state for {operation}: session is {status}")]
    InvalidState {
        operation: &'static str,
        status: String,
    },

    /// A scan is already in progress for this engine instance.
    #[error("A scan is already running (session {0})")]
    AlreadyRunning(String),

    /// The persistence backend has no snapshot for the requested session.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The persistence backend rejected or failed an operation.
    #[error("Storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Local I/O failed (config files, export targets, file stores).
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReconError {
    /// Create an I/O error carrying the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a storage error for the named backend operation.
    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
