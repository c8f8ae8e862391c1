use sprig_types::ObjectId;

/// Errors from reading history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Reading or decoding an object failed.
    #[error(transparent)]
    Store(#[from] sprig_store::StoreError),

    /// Reading the head reference failed.
    #[error(transparent)]
    Ref(#[from] sprig_refs::RefError),

    /// The parent chain revisits a commit.
    #[error("history cycles back to commit {0}")]
    CyclicHistory(ObjectId),
}

/// Result alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
