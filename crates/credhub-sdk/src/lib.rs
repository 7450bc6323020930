//! # CredHub SDK
//!
//! Rust SDK for an OAuth2-protected CredHub credential API.
//!
//! The request pipeline is layered, leaves first:
//! - [`transport`]: a bare HTTP exchange
//! - [`auth`]: bearer token acquisition, attachment and refresh
//! - [`dispatcher`]: status and body mapping to typed results
//! - [`version`]: cached server version and API generation selection
//! - [`bulk`]: list-then-act operations with per-item failure collection
//!
//! [`CredHubClient`] ties them together.

pub mod auth;
pub mod bulk;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod transport;
pub mod types;
pub mod version;

#[cfg(test)]
mod testing;

pub use auth::{AuthError, GrantKind, GrantParameters, TokenIssuer, TokenSet};
pub use bulk::{BulkItemFailure, DeleteFailure};
pub use client::{ClientBuilder, CredHubClient, DEFAULT_CLIENT_ID};
pub use error::{ApiError, ErrorResponse, Result};
pub use transport::{ApiRequest, RawResponse, Transport};
pub use types::*;
pub use version::{ApiGeneration, ServerVersion, VersionGate, VersionSource};
