//! Diff engine for sprig.
//!
//! Compares flattened snapshots (index vs. head commit) and combines the
//! result with a read-only working tree scan into the four status buckets.
//!
//! # Key Types
//!
//! - [`TreeDiff`] / [`TreeChange`] -- Path-level diff between two snapshots
//! - [`WorkdirStatus`] / [`StatusEntry`] / [`FileStatus`] -- Status report

pub mod error;
pub mod status;
pub mod tree_diff;

pub use error::{DiffError, DiffResult};
pub use status::{compute_status, has_changes_to_commit, FileStatus, StatusEntry, WorkdirStatus};
pub use tree_diff::{diff_snapshots, index_snapshot, TreeChange, TreeDiff};
