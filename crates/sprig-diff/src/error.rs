//! Error types for the diff crate.

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Scanning the working tree against the index failed.
    #[error("index error: {0}")]
    Index(#[from] sprig_index::IndexError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
