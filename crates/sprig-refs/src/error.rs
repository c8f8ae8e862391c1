//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference file exists but does not hold a digest.
    #[error("malformed ref {name}: {content:?}")]
    Malformed { name: String, content: String },

    /// A lock guarding in-memory refs was poisoned.
    #[error("ref lock poisoned: {0}")]
    Poisoned(String),

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
