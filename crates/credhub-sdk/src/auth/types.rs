//! Authentication types
//!
//! Token pair, grant parameters, grant selection and the auth error type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Access token value written by logout so later commands know the session ended
pub const REVOKED_TOKEN_MARKER: &str = "revoked";

/// OAuth token pair held by the auth strategy
///
/// An empty access token means "not yet authenticated".
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,
    /// Refresh token for renewal, empty when the grant issued none
    pub refresh_token: String,
}

impl TokenSet {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Token pair written on logout
    pub fn revoked() -> Self {
        Self::new(REVOKED_TOKEN_MARKER, REVOKED_TOKEN_MARKER)
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    pub fn is_revoked(&self) -> bool {
        self.access_token == REVOKED_TOKEN_MARKER
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

fn redact(token: &str) -> &'static str {
    if token.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// Which OAuth2 grant a login or refresh will perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantKind {
    RefreshToken,
    Password,
    ClientCredentials,
}

impl fmt::Display for GrantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GrantKind::RefreshToken => "refresh_token",
            GrantKind::Password => "password",
            GrantKind::ClientCredentials => "client_credentials",
        };
        f.write_str(name)
    }
}

/// Parameters deciding which grant is used when no refresh token is held
///
/// Fixed once the strategy is constructed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GrantParameters {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl GrantParameters {
    /// Parameters for a user login through a public client
    pub fn password(
        client_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Parameters for a confidential client
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Pick the grant for the currently held refresh token.
    ///
    /// A held refresh token always wins. Without one, a public client with
    /// user credentials uses the password grant, anything else falls back to
    /// client credentials.
    pub fn select_grant(&self, refresh_token: &str) -> GrantKind {
        if !refresh_token.is_empty() {
            GrantKind::RefreshToken
        } else if !self.client_id.is_empty()
            && self.client_secret.is_empty()
            && !self.username.is_empty()
            && !self.password.is_empty()
        {
            GrantKind::Password
        } else {
            GrantKind::ClientCredentials
        }
    }
}

impl fmt::Debug for GrantParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantParameters")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .finish()
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token endpoint could not be reached
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The issuer rejected the grant
    #[error("{description}")]
    GrantRejected {
        status: u16,
        error: String,
        description: String,
    },

    /// The token endpoint answered with something other than a token
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Client credentials grant attempted without a client secret
    #[error("Client credentials are incomplete: a client id and client secret are required")]
    MissingClientCredentials,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
