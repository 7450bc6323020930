//! Permission command handlers

use crate::client::{create_authenticated_client, persist_tokens};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::{json_output, print_success};
use std::path::Path;

/// Handle get-permission command
pub async fn handle_get_permission(
    uuid: Option<String>,
    name: Option<String>,
    config: &mut CliConfig,
    config_path: &Path,
) -> Result<()> {
    let key = uuid.or(name).ok_or_else(|| {
        CliError::invalid_argument("A permission uuid or credential name must be provided.")
    })?;

    let client = create_authenticated_client(config)?;
    let result = client.get_permission(&key).await;
    persist_tokens(&client, config, config_path).await?;

    json_output(&result?)
}

/// Handle set-permission command
pub async fn handle_set_permission(
    path: &str,
    actor: &str,
    operations: &[String],
    json: bool,
    config: &mut CliConfig,
    config_path: &Path,
) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let result = client.add_permission(path, actor, operations).await;
    persist_tokens(&client, config, config_path).await?;

    match result? {
        Some(permission) => json_output(&permission),
        None if json => json_output(&serde_json::Value::Null),
        None => {
            print_success(&format!("Permission for {actor} on {path} saved"));
            Ok(())
        }
    }
}
