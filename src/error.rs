//! Error types for hotswap-toggles.

use std::time::Duration;

/// Result type alias for hotswap-toggles operations.
pub type Result<T> = std::result::Result<T, ToggleError>;

/// Errors that can occur while building or reloading toggle state.
///
/// Only [`ToggleError::DuplicateDefinition`] and
/// [`ToggleError::DuplicatePrecedence`] are fatal. Everything else is
/// recoverable: resolution proceeds without the offending input and the
/// problem is surfaced through a [`ReloadReport`](crate::core::ReloadReport).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToggleError {
    /// Two catalog entries share a name.
    #[error("Duplicate toggle definition: '{name}'")]
    DuplicateDefinition {
        /// The name that appears more than once
        name: String,
    },

    /// Two override sources declare the same precedence rank.
    #[error("Sources '{first}' and '{second}' share precedence rank {rank}")]
    DuplicatePrecedence {
        /// The contested rank
        rank: i32,
        /// Name of the first source registered with this rank
        first: String,
        /// Name of the second source registered with this rank
        second: String,
    },

    /// An override source names a toggle that is not in the catalog.
    #[error("Source '{source_id}' overrides unknown toggle '{key}'")]
    UnknownOverrideKey {
        /// The source that supplied the key
        source_id: String,
        /// The unknown toggle name
        key: String,
    },

    /// An override value could not be interpreted as a boolean.
    #[error("Source '{source_id}' has an invalid value for '{key}': {reason}")]
    InvalidOverrideValue {
        /// The source that supplied the value
        source_id: String,
        /// The toggle name
        key: String,
        /// Why the value was rejected
        reason: String,
    },

    /// An override source failed to load.
    #[error("Source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// The failing source
        source_id: String,
        /// The underlying failure
        reason: String,
    },

    /// Loading sources during a reload exceeded the deadline.
    #[error("Reload timed out after {0:?}")]
    ReloadTimeout(Duration),

    /// Failed to load overrides from a transport.
    #[error("Failed to load overrides: {0}")]
    LoadError(String),

    /// Failed to parse override data.
    #[error("Failed to parse overrides: {0}")]
    ParseError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(String),

    /// Generic error for other cases.
    #[error("Toggle error: {0}")]
    Other(String),
}

impl ToggleError {
    /// Returns true if the process must not continue with this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateDefinition { .. } | Self::DuplicatePrecedence { .. }
        )
    }
}

impl From<std::io::Error> for ToggleError {
    fn from(err: std::io::Error) -> Self {
        ToggleError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for ToggleError {
    fn from(err: config::ConfigError) -> Self {
        ToggleError::ParseError(err.to_string())
    }
}
