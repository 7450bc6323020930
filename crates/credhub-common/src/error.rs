//! Configuration error type shared across crates

use thiserror::Error;

/// Errors raised while loading, validating or persisting configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The configuration source could not be parsed
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    /// A required value is absent
    #[error("Missing configuration value: {key}")]
    MissingValue { key: String },

    /// A value is present but unusable
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Reading or writing the configuration file failed
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigurationError {
    /// Shorthand for a missing key
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingValue { key: key.into() }
    }
}
