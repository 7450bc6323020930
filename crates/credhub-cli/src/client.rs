//! CLI-specific client creation and token persistence
//!
//! The SDK never reads configuration. Commands build a client from the
//! loaded [`CliConfig`] snapshot and write the token pair back once the
//! command has run, so a refresh during one command carries over to the next.

use crate::config::CliConfig;
use crate::error::Result;
use credhub_sdk::{ClientBuilder, CredHubClient, GrantParameters, TokenSet};
use std::path::Path;
use tracing::debug;

/// Client for unauthenticated calls against an explicit URL
pub fn create_unauthenticated_client(api_url: &str, skip_tls_validation: bool) -> Result<CredHubClient> {
    Ok(ClientBuilder::new()
        .base_url(api_url)
        .skip_tls_validation(skip_tls_validation)
        .no_auth()
        .build()?)
}

/// Client authenticated with the stored tokens
///
/// Client credentials from the environment replace a logged-out session
/// instead of failing with the revoked-token error.
pub fn create_authenticated_client(config: &CliConfig) -> Result<CredHubClient> {
    let mut tokens = config.tokens();
    let grant = if config.has_client_credentials() {
        if tokens.is_revoked() {
            debug!("Session was logged out, using client credentials from the environment");
            tokens = TokenSet::default();
        }
        config.grant_parameters()
    } else {
        GrantParameters::password(config.client_id.clone(), "", "")
    };

    create_client_with(config, grant, tokens)
}

/// Client that performs a fresh grant with the given parameters
pub fn create_login_client(config: &CliConfig, grant: GrantParameters) -> Result<CredHubClient> {
    create_client_with(config, grant, TokenSet::default())
}

fn create_client_with(
    config: &CliConfig,
    grant: GrantParameters,
    tokens: TokenSet,
) -> Result<CredHubClient> {
    let api_url = config.require_api_url()?;
    let mut builder = ClientBuilder::new()
        .base_url(api_url)
        .skip_tls_validation(config.skip_tls_validation)
        .grant_parameters(grant)
        .with_tokens(tokens.access_token, tokens.refresh_token);
    if !config.auth_url.is_empty() {
        builder = builder.auth_url(config.auth_url.clone());
    }
    Ok(builder.build()?)
}

/// Write the client's current tokens back if they changed
pub async fn persist_tokens(
    client: &CredHubClient,
    config: &mut CliConfig,
    config_path: &Path,
) -> Result<()> {
    let Some(tokens) = client.tokens().await else {
        return Ok(());
    };
    if tokens == config.tokens() {
        return Ok(());
    }

    debug!("Tokens changed, saving configuration");
    config.set_tokens(tokens);
    config.save_to_path(config_path).await
}
