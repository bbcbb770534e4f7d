//! Errors raised while binding typed settings.

use thiserror::Error;

use crate::source::SourceError;

/// Errors surfaced by the resolution pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A typed setting held text that could not be converted.
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        /// Fully-qualified key that held the value.
        key: String,
        /// Offending value.
        value: String,
        /// Description of the expected shape.
        reason: String,
    },
    /// A property source failed to load.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ConfigError {
    /// Builds an [`ConfigError::InvalidValue`] error.
    #[must_use]
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
