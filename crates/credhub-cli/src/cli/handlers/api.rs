//! API target command handler

use crate::client::create_unauthenticated_client;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{print_field, print_info, print_success};
use std::path::Path;
use tracing::debug;

/// Handle api command
pub async fn handle_api(
    server: Option<String>,
    skip_tls_validation: bool,
    config: &mut CliConfig,
    config_path: &Path,
) -> Result<()> {
    let Some(server) = server else {
        if config.api_url.is_empty() {
            print_info("No API target is set");
        } else {
            print_field("Current target", &config.api_url);
        }
        return Ok(());
    };

    let api_url = normalize_api_url(&server);
    debug!("Targeting {}", api_url);

    let client = create_unauthenticated_client(&api_url, skip_tls_validation)?;
    let auth_url = client.auth_url().await?;

    if config.api_url != api_url {
        // tokens from another server are meaningless here
        config.set_tokens(Default::default());
    }
    config.api_url = api_url;
    config.auth_url = auth_url;
    config.skip_tls_validation = skip_tls_validation;
    config.save_to_path(config_path).await?;

    print_success(&format!("Setting the target url: {}", config.api_url));
    if skip_tls_validation {
        print_info("Warning: The targeted TLS certificate has not been verified for this connection.");
    }
    Ok(())
}

/// Default to https when no scheme is given
fn normalize_api_url(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        server.to_string()
    } else {
        format!("https://{server}")
    }
}
