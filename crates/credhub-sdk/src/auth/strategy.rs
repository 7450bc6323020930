//! Authentication strategies wrapping the raw transport
//!
//! [`AuthStrategy::NoAuth`] forwards requests untouched. [`OAuthStrategy`]
//! attaches a bearer token, acquiring one first when none is held, and on an
//! expired-token answer performs exactly one refresh-and-retry cycle.

use super::issuer::TokenIssuer;
use super::types::{AuthError, AuthResult, GrantKind, GrantParameters, TokenSet};
use crate::error::Result;
use crate::transport::{ApiRequest, RawResponse, Transport};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// `error` value the API uses to signal that the bearer token must be refreshed
pub const ACCESS_TOKEN_EXPIRED: &str = "access_token_expired";

/// How requests are authenticated, chosen once when the client is built
pub enum AuthStrategy {
    /// Pass-through, no credentials attached
    NoAuth(Arc<dyn Transport>),
    /// Bearer tokens from an OAuth2 issuer
    OAuth(OAuthStrategy),
}

impl AuthStrategy {
    /// Execute the request as the authenticated principal
    pub async fn do_request(&self, request: &ApiRequest) -> Result<RawResponse> {
        match self {
            AuthStrategy::NoAuth(transport) => transport.execute(request).await,
            AuthStrategy::OAuth(oauth) => oauth.do_request(request).await,
        }
    }

    /// The raw transport underneath, for calls that need no credentials
    pub fn transport(&self) -> &Arc<dyn Transport> {
        match self {
            AuthStrategy::NoAuth(transport) => transport,
            AuthStrategy::OAuth(oauth) => &oauth.transport,
        }
    }

    pub fn oauth(&self) -> Option<&OAuthStrategy> {
        match self {
            AuthStrategy::NoAuth(_) => None,
            AuthStrategy::OAuth(oauth) => Some(oauth),
        }
    }
}

impl std::fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthStrategy::NoAuth(_) => f.write_str("NoAuth"),
            AuthStrategy::OAuth(oauth) => f
                .debug_struct("OAuth")
                .field("grant", &oauth.grant)
                .finish_non_exhaustive(),
        }
    }
}

/// Stateful OAuth2 strategy owning the token pair
///
/// The token pair is only reachable through [`do_request`](Self::do_request),
/// [`login`](Self::login), [`refresh`](Self::refresh) and the read-only
/// [`tokens`](Self::tokens) snapshot. The lock is held across the whole
/// read → send → refresh → overwrite sequence so concurrent callers sharing
/// one strategy never refresh twice or overwrite a newer pair.
pub struct OAuthStrategy {
    grant: GrantParameters,
    tokens: Mutex<TokenSet>,
    issuer: Arc<dyn TokenIssuer>,
    transport: Arc<dyn Transport>,
}

impl OAuthStrategy {
    pub fn new(
        grant: GrantParameters,
        tokens: TokenSet,
        issuer: Arc<dyn TokenIssuer>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            grant,
            tokens: Mutex::new(tokens),
            issuer,
            transport,
        }
    }

    /// Send the request with a bearer token, refreshing once if it has expired
    pub async fn do_request(&self, request: &ApiRequest) -> Result<RawResponse> {
        let mut tokens = self.tokens.lock().await;

        if !tokens.has_access_token() {
            debug!("No access token held, logging in");
            self.grant(&mut tokens).await?;
        }

        let response = self
            .transport
            .execute(&request.with_bearer(&tokens.access_token))
            .await?;

        if !is_token_expired(&response) {
            return Ok(response);
        }

        debug!("Access token expired, refreshing and resending once");
        self.grant(&mut tokens).await?;

        self.transport
            .execute(&request.with_bearer(&tokens.access_token))
            .await
    }

    /// Acquire tokens unless an access token is already held
    pub async fn login(&self) -> AuthResult<()> {
        let mut tokens = self.tokens.lock().await;
        if tokens.has_access_token() {
            return Ok(());
        }
        self.grant(&mut tokens).await
    }

    /// Run a grant now, replacing whatever pair is held
    pub async fn refresh(&self) -> AuthResult<()> {
        let mut tokens = self.tokens.lock().await;
        self.grant(&mut tokens).await
    }

    /// Snapshot of the current token pair
    pub async fn tokens(&self) -> TokenSet {
        self.tokens.lock().await.clone()
    }

    pub async fn access_token(&self) -> String {
        self.tokens.lock().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> String {
        self.tokens.lock().await.refresh_token.clone()
    }

    pub fn grant_parameters(&self) -> &GrantParameters {
        &self.grant
    }

    async fn grant(&self, tokens: &mut TokenSet) -> AuthResult<()> {
        let kind = self.grant.select_grant(&tokens.refresh_token);
        debug!("Performing {} grant", kind);

        let params = &self.grant;
        let new_tokens = match kind {
            GrantKind::RefreshToken => {
                self.issuer
                    .refresh_grant(
                        &params.client_id,
                        &params.client_secret,
                        &tokens.refresh_token,
                    )
                    .await?
            }
            GrantKind::Password => {
                self.issuer
                    .password_grant(
                        &params.client_id,
                        &params.client_secret,
                        &params.username,
                        &params.password,
                    )
                    .await?
            }
            GrantKind::ClientCredentials => {
                if params.client_id.is_empty() || params.client_secret.is_empty() {
                    return Err(AuthError::MissingClientCredentials);
                }
                self.issuer
                    .client_credentials_grant(&params.client_id, &params.client_secret)
                    .await?
            }
        };

        *tokens = new_tokens;
        info!("Obtained new tokens via {} grant", kind);
        Ok(())
    }
}

#[derive(Deserialize)]
struct ExpiryProbe {
    #[serde(default)]
    error: Option<String>,
}

/// Whether the response is the API's expired-token signal
pub fn is_token_expired(response: &RawResponse) -> bool {
    if !(response.status.is_client_error() || response.status.is_server_error()) {
        return false;
    }
    serde_json::from_slice::<ExpiryProbe>(&response.body)
        .ok()
        .and_then(|probe| probe.error)
        .is_some_and(|error| error == ACCESS_TOKEN_EXPIRED)
}
