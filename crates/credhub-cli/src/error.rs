//! Error types for the CredHub CLI

use color_eyre::eyre::Report;
use thiserror::Error;

/// CLI error type with minimal variants
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file issues
    #[error(transparent)]
    Config(#[from] credhub_common::ConfigurationError),

    /// API communication errors, shown with the server's own wording
    #[error(transparent)]
    Api(#[from] credhub_sdk::ApiError),

    /// No server targeted yet
    #[error("An API target is not set. Please target the location of your server with `credhub api <URL>` to continue.")]
    NoApiTarget,

    /// Bad combination of command line arguments
    #[error("{0}")]
    InvalidArgument(String),

    /// Terminal prompt failed
    #[error("Failed to read input: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// JSON rendering or parsing of user input
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Everything else (using color-eyre's Report for rich errors)
    #[error(transparent)]
    Internal(#[from] Report),
}

impl CliError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(Report::msg(message.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
