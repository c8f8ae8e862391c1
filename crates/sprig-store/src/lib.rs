//! Content-addressed object storage for sprig.
//!
//! This crate implements a hash-keyed object store analogous to git's
//! `.git/objects/` directory. Blobs, trees and commits are stored as
//! immutable records identified by the digest of their kind-framed payload.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw file contents
//! - [`Tree`] -- directory listing mapping names to blob/tree references
//! - [`Commit`] -- root tree plus lineage and author metadata
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one file per object under `objects/<2-hex>/<62-hex>`
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. A write whose target already exists is a no-op; nothing is overwritten.
//! 3. On disk, an object becomes visible only through an atomic rename.
//! 4. The store never interprets payloads -- typed decoding lives on the
//!    record types.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, ObjectKind, Signature, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
