//! Credential command handlers

use crate::client::{create_authenticated_client, persist_tokens};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::{json_output, print_failures, print_field, print_info, print_success};
use credhub_sdk::{CredHubClient, FindResults, OverwriteMode};
use serde_json::Value;
use std::path::Path;

/// Arguments of the set command
#[derive(Debug)]
pub struct SetArgs {
    pub name: String,
    pub credential_type: String,
    pub value: String,
    pub no_overwrite: bool,
}

/// Types whose value is a plain string rather than a JSON document
const STRING_TYPES: &[&str] = &["value", "password"];

/// Handle get command
pub async fn handle_get(
    name: Option<String>,
    id: Option<String>,
    config: &mut CliConfig,
    config_path: &Path,
) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let result = match (name, id) {
        (Some(name), _) => client.get_by_name(&name).await,
        (None, Some(id)) => client.get_by_id(&id).await,
        (None, None) => {
            return Err(CliError::invalid_argument(
                "A name or ID must be provided. Please update and retry your request.",
            ))
        }
    };
    persist_tokens(&client, config, config_path).await?;

    json_output(&result?)
}

/// Handle find command
pub async fn handle_find(
    path: Option<String>,
    name_like: Option<String>,
    json: bool,
    config: &mut CliConfig,
    config_path: &Path,
) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let result = match name_like {
        Some(fragment) => client.find_by_partial_name(&fragment).await,
        None => client.find_by_path(path.as_deref().unwrap_or("/")).await,
    };
    persist_tokens(&client, config, config_path).await?;

    print_find_results(&result?, json)
}

fn print_find_results(results: &FindResults, json: bool) -> Result<()> {
    if json {
        return json_output(results);
    }
    if results.credentials.is_empty() {
        print_info("No credentials exist which match the provided parameters.");
        return Ok(());
    }
    for credential in &results.credentials {
        let created = credential
            .version_created_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();
        print_field(&credential.name, &created);
    }
    Ok(())
}

/// Handle set command
pub async fn handle_set(args: SetArgs, config: &mut CliConfig, config_path: &Path) -> Result<()> {
    let value = parse_value(&args.credential_type, &args.value)?;
    let mode = if args.no_overwrite {
        OverwriteMode::NoOverwrite
    } else {
        OverwriteMode::Overwrite
    };

    let client = create_authenticated_client(config)?;
    let result = client
        .set_credential(&args.name, &args.credential_type, value, Some(mode))
        .await;
    persist_tokens(&client, config, config_path).await?;

    json_output(&result?)
}

/// Credential value as sent to the server
fn parse_value(credential_type: &str, raw: &str) -> Result<Value> {
    if STRING_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(credential_type))
    {
        return Ok(Value::String(raw.to_string()));
    }
    serde_json::from_str(raw).map_err(|e| {
        CliError::invalid_argument(format!(
            "The value for a {credential_type} credential must be valid JSON: {e}"
        ))
    })
}

/// Handle regenerate command
pub async fn handle_regenerate(name: &str, config: &mut CliConfig, config_path: &Path) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let result = client.regenerate(name).await;
    persist_tokens(&client, config, config_path).await?;

    json_output(&result?)
}

/// Handle delete command
pub async fn handle_delete(
    name: Option<String>,
    path: Option<String>,
    json: bool,
    config: &mut CliConfig,
    config_path: &Path,
) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let result = match (name, path) {
        (Some(name), _) => delete_by_name(&client, &name).await,
        (None, Some(path)) => delete_by_path(&client, &path, json).await,
        (None, None) => Err(CliError::invalid_argument(
            "A name or path must be provided. Please update and retry your request.",
        )),
    };
    persist_tokens(&client, config, config_path).await?;
    result
}

async fn delete_by_name(client: &CredHubClient, name: &str) -> Result<()> {
    client.delete_by_name(name).await?;
    print_success("Credential successfully deleted");
    Ok(())
}

async fn delete_by_path(client: &CredHubClient, path: &str, json: bool) -> Result<()> {
    let failures = client
        .delete_by_path(path, |name| {
            if !json {
                print_success(&format!("Successfully deleted {name}"));
            }
        })
        .await?;

    if json {
        return json_output(&failures);
    }
    if failures.is_empty() {
        print_success("All credentials successfully deleted.");
        Ok(())
    } else {
        print_failures("The following credentials failed to delete:", &failures)
    }
}
