//! Authentication command handlers

use crate::client::{create_authenticated_client, create_login_client, persist_tokens};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::{print_error, print_success};
use credhub_sdk::{ApiError, GrantParameters, DEFAULT_CLIENT_ID};
use dialoguer::{Input, Password};
use std::path::Path;
use tracing::debug;

/// Credentials given on the command line or through the environment
#[derive(Debug, Default)]
pub struct LoginCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_name: Option<String>,
    pub client_secret: Option<String>,
}

impl LoginCredentials {
    /// Pick the grant parameters, prompting for user credentials when needed
    ///
    /// User logins always go through `cli_client_id`, never through a client
    /// remembered from an earlier client-credentials login.
    fn into_grant(self, cli_client_id: &str) -> Result<GrantParameters> {
        let has_user = self.username.is_some() || self.password.is_some();

        match (self.client_name, self.client_secret) {
            (Some(_), Some(_)) if has_user => Err(CliError::invalid_argument(
                "Client, password and user credentials may not be combined. Please update and retry your request with a single login method.",
            )),
            (Some(client_name), Some(client_secret)) => Ok(GrantParameters::client_credentials(
                client_name,
                client_secret,
            )),
            (Some(_), None) | (None, Some(_)) => Err(CliError::invalid_argument(
                "Both client name and client secret must be provided to authenticate. Please update and retry your request.",
            )),
            (None, None) => {
                let username = match self.username {
                    Some(username) => username,
                    None => Input::<String>::new().with_prompt("username").interact_text()?,
                };
                let password = match self.password {
                    Some(password) => password,
                    None => Password::new().with_prompt("password").interact()?,
                };
                Ok(GrantParameters::password(cli_client_id, username, password))
            }
        }
    }
}

/// Handle login command
pub async fn handle_login(
    credentials: LoginCredentials,
    config: &mut CliConfig,
    config_path: &Path,
) -> Result<()> {
    config.require_api_url()?;

    let grant = credentials.into_grant(DEFAULT_CLIENT_ID)?;
    debug!("Logging in as {}", grant.client_id);
    config.client_id = grant.client_id.clone();

    let client = create_login_client(config, grant)?;
    client.login().await?;
    persist_tokens(&client, config, config_path).await?;

    print_success("Login Successful");
    Ok(())
}

/// Handle logout command
pub async fn handle_logout(config: &mut CliConfig, config_path: &Path) -> Result<()> {
    config.revoke_tokens();
    config.save_to_path(config_path).await?;

    print_success("Logout Successful");
    Ok(())
}

/// Handle token command
pub async fn handle_token(config: &mut CliConfig, config_path: &Path) -> Result<()> {
    let tokens = config.tokens();
    let logged_in = tokens.has_access_token() && !tokens.is_revoked();

    if !logged_in && !config.has_client_credentials() {
        print_error(&ApiError::RevokedToken.to_string());
        return Ok(());
    }

    let client = create_authenticated_client(config)?;
    client.refresh().await?;
    let tokens = client.tokens().await.unwrap_or_default();

    // sessions built from environment client credentials stay out of the file
    if config.has_client_credentials() {
        debug!("Token issued for client credentials, not saving configuration");
    } else {
        persist_tokens(&client, config, config_path).await?;
    }

    println!("Bearer {}", tokens.access_token);
    Ok(())
}
