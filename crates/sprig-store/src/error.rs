use sprig_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// No object id starts with the given prefix.
    #[error("no object matches prefix {0}")]
    PrefixNotFound(String),

    /// More than one object id starts with the given prefix.
    #[error("prefix {prefix} is ambiguous ({candidates} candidates)")]
    AmbiguousPrefix { prefix: String, candidates: usize },

    /// The prefix is shorter than the minimum accepted length.
    #[error("prefix {prefix} is too short: at least {min} hex characters required")]
    PrefixTooShort { prefix: String, min: usize },

    /// The string is not a valid (partial) object id.
    #[error("invalid object id: {0}")]
    InvalidId(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored bytes do not hash to the id they are stored under.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// A tree payload is structurally invalid.
    #[error("malformed tree: {reason}")]
    MalformedTree { reason: String },

    /// A commit payload is structurally invalid.
    #[error("malformed commit: {reason}")]
    MalformedCommit { reason: String },

    /// An author or committer identity cannot be recorded in a commit.
    #[error("invalid identity {identity:?}: {reason}")]
    InvalidIdentity { identity: String, reason: String },
}

impl StoreError {
    pub(crate) fn malformed_tree(reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_commit(reason: impl Into<String>) -> Self {
        Self::MalformedCommit {
            reason: reason.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
