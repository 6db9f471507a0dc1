//! Error types for checkpoint operations

use thiserror::Error;

/// Errors raised by checkpoint storage backends
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// JSON serialization or deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error from a durable backend
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input or configuration
    #[error("Invalid checkpoint operation: {0}")]
    Invalid(String),
}

/// Result type alias for checkpoint operations
pub type Result<T> = std::result::Result<T, CheckpointError>;
