//! Error types for the enforcement settings engine

use thiserror::Error;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while validating or applying a configuration update
///
/// All of these are raised synchronously to the caller of `config`.
/// Nothing is retried; an update that fails part way may already have
/// applied the options that came before the failing one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The `mode` option does not name a variance mode
    #[error("Mode must be one of mode choices, got '{name}'")]
    InvalidMode { name: String },

    /// `groups.set` tried to override the reserved `default` group
    #[error("Cannot set 'default' group status, use 'default' option rather than 'set'")]
    ReservedGroup,

    /// `groups` contains a key that is not a group option
    #[error("Unknown option for groups '{key}'")]
    UnknownGroupOption { key: String },

    /// The update contains a top-level key that is not an option
    #[error("Unknown option '{key}'")]
    UnknownOption { key: String },

    /// An option carries a value of the wrong shape
    #[error("Invalid value for '{key}': expected {expected}")]
    InvalidValue { key: String, expected: &'static str },

    /// A core state key cannot be removed or retyped
    #[error("State key '{key}' is protected")]
    ProtectedKey { key: String },

    /// The state is borrowed by an operation that is still running
    #[error("Settings state is busy: {operation}")]
    StateBusy { operation: &'static str },
}

impl ConfigError {
    /// Create a new invalid mode error
    pub fn invalid_mode(name: impl Into<String>) -> Self {
        Self::InvalidMode { name: name.into() }
    }

    /// Create a new unknown group option error
    pub fn unknown_group_option(key: impl Into<String>) -> Self {
        Self::UnknownGroupOption { key: key.into() }
    }

    /// Create a new unknown option error
    pub fn unknown_option(key: impl Into<String>) -> Self {
        Self::UnknownOption { key: key.into() }
    }

    /// Create a new invalid value error
    pub fn invalid_value(key: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidValue {
            key: key.into(),
            expected,
        }
    }

    /// Create a new protected key error
    pub fn protected_key(key: impl Into<String>) -> Self {
        Self::ProtectedKey { key: key.into() }
    }

    /// Create a new state busy error
    pub const fn state_busy(operation: &'static str) -> Self {
        Self::StateBusy { operation }
    }
}
