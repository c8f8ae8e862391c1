//! Staging index for sprig.
//!
//! Tracks the working tree state, detects file changes via size/mtime
//! metadata with content hashing as the fallback, and turns the staged
//! entries into a hierarchy of tree objects for the next commit.
//!
//! # Key Types
//!
//! - [`Index`] -- The staging area (BTreeMap-backed), persisted as a text file
//! - [`IndexEntry`] -- A tracked file: digest, mode, size, mtime
//! - [`StageScope`] / [`ReconcileReport`] -- What a reconcile pass covered and changed
//! - [`WorkdirScan`] -- Read-only comparison of the working tree with the index
//! - [`build_tree`] -- Index entries to root tree digest

pub mod builder;
pub mod entry;
pub mod error;
pub mod index;
pub mod workdir;

pub use builder::build_tree;
pub use entry::IndexEntry;
pub use error::{IndexError, IndexResult};
pub use index::{Index, ReconcileReport, StageScope};
pub use workdir::{WorkdirScan, CONTROL_DIR};
