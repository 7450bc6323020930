//! Version command handler

use crate::client::{create_authenticated_client, persist_tokens};
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{json_output, print_field};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

const SERVER_VERSION_NOT_FOUND: &str =
    "Not Found. Have you targeted and authenticated against a CredHub server?";

#[derive(Debug, Serialize)]
struct Versions {
    cli: &'static str,
    server: String,
}

/// Handle version command
///
/// Never fails on server problems; the server version is reported as not
/// found instead. Tokens refreshed while probing the server are saved.
pub async fn handle_version(json: bool, config: &mut CliConfig, config_path: &Path) -> Result<()> {
    let server = server_version(config, config_path)
        .await?
        .unwrap_or_else(|| SERVER_VERSION_NOT_FOUND.to_string());
    let versions = Versions {
        cli: env!("CARGO_PKG_VERSION"),
        server,
    };

    if json {
        return json_output(&versions);
    }
    print_field("CLI Version", versions.cli);
    print_field("Server Version", &versions.server);
    Ok(())
}

async fn server_version(config: &mut CliConfig, config_path: &Path) -> Result<Option<String>> {
    if config.api_url.is_empty() {
        return Ok(None);
    }
    let client = match create_authenticated_client(config) {
        Ok(client) => client,
        Err(e) => {
            debug!("Cannot build client for version lookup: {}", e);
            return Ok(None);
        }
    };

    // the server version is only shown to authenticated users
    let access = client.find_by_path("/").await;
    persist_tokens(&client, config, config_path).await?;
    if let Err(e) = access {
        debug!("Server rejected version lookup: {}", e);
        return Ok(None);
    }
    Ok(client.server_version().await.ok())
}
