use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("not a sprig repository (or any parent): {0}")]
    NotARepository(PathBuf),

    #[error("repository already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("aborting commit due to empty commit message")]
    EmptyMessage,

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("this operation must be run in a work tree")]
    BareRepository,

    #[error("store error: {0}")]
    Store(#[from] sprig_store::StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] sprig_refs::RefError),

    #[error("index error: {0}")]
    Index(#[from] sprig_index::IndexError),

    #[error("history error: {0}")]
    History(#[from] sprig_history::HistoryError),

    #[error("status error: {0}")]
    Diff(#[from] sprig_diff::DiffError),

    #[error("config error: {0}")]
    Config(#[from] sprig_config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
