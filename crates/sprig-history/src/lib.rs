//! Commit and tree reading for sprig.
//!
//! Reconstructs historical snapshots from the object store: resolving the
//! head reference, flattening a commit's tree into a path map, and walking
//! the linear parent chain newest first.

pub mod error;
pub mod reader;
pub mod walk;

pub use error::{HistoryError, HistoryResult};
pub use reader::{FlatEntry, HistoryReader, Snapshot};
pub use walk::HistoryWalk;
