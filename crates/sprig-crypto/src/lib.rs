//! Content hashing for sprig.
//!
//! Every object digest is BLAKE3 over `"<kind> <len>\0"` followed by the
//! payload. The kind tag in the frame keeps a blob and a tree with identical
//! bytes from colliding.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
