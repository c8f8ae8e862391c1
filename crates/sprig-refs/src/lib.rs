//! Reference management for sprig.
//!
//! History is a single linear chain, so the only references are `HEAD`
//! (the newest commit) and `ORIG_HEAD` (the head before the last commit).
//! Both are one-line files in the control directory holding a full hex
//! digest; an empty `HEAD` means nothing has been committed yet.
//!
//! # Modules
//!
//! - [`error`]: Error types for ref operations
//! - [`traits`]: The [`RefStore`] trait defining the storage interface
//! - [`file`]: [`FileRefStore`], backed by the control directory
//! - [`memory`]: In-memory [`InMemoryRefStore`] for tests

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{RefError, Result};
pub use file::FileRefStore;
pub use memory::InMemoryRefStore;
pub use traits::RefStore;
