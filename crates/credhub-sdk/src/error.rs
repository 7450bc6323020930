//! Error types for the CredHub SDK

use crate::auth::AuthError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for CredHub API operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not complete the HTTP exchange
    #[error("Network error: {message}")]
    Network { message: String },

    /// The API rejected the request credentials (HTTP 401)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The stored access token was revoked by a logout
    #[error("You are not currently authenticated. Please log in to continue.")]
    RevokedToken,

    /// A login or refresh grant was rejected by the token issuer
    #[error(transparent)]
    AuthGrant(#[from] AuthError),

    /// Non-success status carrying an `error` message
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The response body was not the expected JSON
    #[error("The response body could not be decoded: {message}")]
    Decode { message: String },

    /// Resource absent from an otherwise successful response
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// The server reported a version that is not a semantic version
    #[error("Unable to parse server version '{version}'")]
    VersionParse { version: String },

    /// The request could not be built
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Client misconfiguration (missing URLs, bad TLS setup)
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network {
            message: err.to_string(),
        }
    }
}

impl ApiError {
    /// Get error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network { .. } => "CREDHUB_NETWORK_ERROR",
            ApiError::Unauthorized { .. } => "CREDHUB_UNAUTHORIZED",
            ApiError::RevokedToken => "CREDHUB_REVOKED_TOKEN",
            ApiError::AuthGrant(_) => "CREDHUB_AUTH_GRANT_ERROR",
            ApiError::Server { .. } => "CREDHUB_SERVER_ERROR",
            ApiError::Decode { .. } => "CREDHUB_DECODE_ERROR",
            ApiError::NotFound { .. } => "CREDHUB_NOT_FOUND",
            ApiError::VersionParse { .. } => "CREDHUB_VERSION_PARSE_ERROR",
            ApiError::InvalidRequest { .. } => "CREDHUB_INVALID_REQUEST",
            ApiError::Config { .. } => "CREDHUB_CONFIG_ERROR",
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// Check if the error means the caller must authenticate again
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { .. } | ApiError::RevokedToken | ApiError::AuthGrant(_)
        )
    }
}

/// Error body returned by the CredHub API on non-success statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human readable error message
    #[serde(default)]
    pub error: Option<String>,

    /// Additional detail some endpoints include
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}
