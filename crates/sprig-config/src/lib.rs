//! Repository configuration for sprig.
//!
//! The configuration file is INI-style text: `[section]` headers followed by
//! `key = value` lines, with `#`/`;` comments. [`ConfigFile`] edits it while
//! keeping comments, blank lines and untouched lines byte-for-byte. A key may
//! carry several values; single-value edits refuse to guess which one to
//! change.
//!
//! [`CoreSettings`] is the typed view of the `core` section.

pub mod error;
pub mod file;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use file::{split_key, ConfigFile};
pub use settings::CoreSettings;
