//! High-level SDK for sprig.
//!
//! [`Repository`] ties the object store, `HEAD`, the staging index and the
//! configuration file together behind the operations a command-line front
//! end needs. Every path is passed in explicitly; nothing here reads the
//! process working directory.

pub mod commit;
pub mod error;
pub mod layout;
pub mod repository;

pub use commit::{CatObject, CommitOutcome, LogEntry};
pub use error::{SdkError, SdkResult};
pub use repository::Repository;

// Re-export key types
pub use sprig_config::{split_key, ConfigError, ConfigFile, CoreSettings};
pub use sprig_diff::{FileStatus, StatusEntry, WorkdirStatus};
pub use sprig_index::{ReconcileReport, CONTROL_DIR};
pub use sprig_store::{Commit, ObjectKind, Signature};
pub use sprig_types::ObjectId;
