//! Error types for configuration handling.

/// Errors that can occur while reading or editing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A single-value operation hit a key with several values.
    #[error("{key} has multiple values; use --replace-all or --unset-all")]
    MultipleValues { key: String },

    /// The key has no value.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// A key is not of the form `section.name`.
    #[error("invalid key {0:?}: expected section.name")]
    InvalidKey(String),

    /// A value cannot be read as the expected type.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// A line is neither a comment, a section header nor a `key = value` pair.
    #[error("config parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
