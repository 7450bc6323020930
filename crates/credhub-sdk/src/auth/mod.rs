//! Authentication module for the CredHub SDK
//!
//! This module provides the OAuth 2.0 side of the request pipeline:
//! - Token pair and grant parameter types with grant selection
//! - The token issuer boundary and its UAA implementation
//! - The auth strategy that attaches and refreshes bearer tokens

pub mod issuer;
pub mod strategy;
pub mod types;

pub use issuer::{TokenIssuer, UaaClient};
pub use strategy::{is_token_expired, AuthStrategy, OAuthStrategy, ACCESS_TOKEN_EXPIRED};
pub use types::{
    AuthError, AuthResult, GrantKind, GrantParameters, TokenSet, REVOKED_TOKEN_MARKER,
};
