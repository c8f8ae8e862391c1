//! Error types for the index crate.

use std::path::PathBuf;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The persisted index has a structurally invalid line.
    #[error("corrupt index at line {line}: {reason}")]
    CorruptIndex { line: usize, reason: String },

    /// Another process holds the index lock.
    #[error("index is locked: {} exists", .0.display())]
    Locked(PathBuf),

    /// The path resolves outside the repository root.
    #[error("path is outside the repository: {}", .0.display())]
    OutsideRepository(PathBuf),

    /// The path exists neither on disk nor in the index.
    #[error("pathspec did not match any files: {0}")]
    PathNotFound(String),

    /// An invalid path was provided.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] sprig_store::StoreError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<walkdir::Error> for IndexError {
    fn from(e: walkdir::Error) -> Self {
        Self::Io(e.into())
    }
}

impl IndexError {
    pub(crate) fn corrupt(line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptIndex {
            line,
            reason: reason.into(),
        }
    }
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
