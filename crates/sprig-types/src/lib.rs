//! Foundation types for sprig.
//!
//! Every other sprig crate depends on `sprig-types`. The crate is deliberately
//! tiny: it only knows what an object identifier looks like, not how one is
//! computed (see `sprig-crypto`) or stored (see `sprig-store`).
//!
//! # Key Types
//!
//! - [`ObjectId`]: 32-byte content digest, rendered as 64 lowercase hex characters
//! - [`TypeError`]: parse failures for identifiers

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{is_hex, ObjectId, HEX_LEN, MIN_PREFIX_LEN};
