use crate::cli::{commands::Commands, handlers};
use crate::config::CliConfig;
use crate::error::Result;
use clap::Parser;
use clap_verbosity_flag::{OffLevel, Verbosity};
use std::path::PathBuf;

/// CredHub CLI - credential management against a CredHub server
#[derive(Parser, Debug)]
#[command(
    name = "credhub",
    author = "CredHub CLI Team",
    version,
    about = "CredHub CLI - credential management against a CredHub server",
    long_about = "Command-line interface for a CredHub credential server.

QUICK START:
  credhub api https://credhub.example.com:8844   # Target a server
  credhub login -u admin                          # Authenticate
  credhub get -n /example-password                # Read a credential

CREDENTIALS:
  credhub set -n /c -t password -w secret         # Store a value
  credhub regenerate -n /c                        # Regenerate a value
  credhub find -p /team                           # List a path
  credhub delete -p /team                         # Delete a whole path

PERMISSIONS:
  credhub set-permission -p /team/* -a uaa-user:123 -o read,write
  credhub get-permission -u <uuid>"
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CREDHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long = "output-json", global = true)]
    pub json: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<OffLevel>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => CliConfig::default_path()?,
        };
        let mut config = CliConfig::load_from_path(&config_path)?;
        let json = self.json;

        match self.command {
            // Targeting and authentication
            Commands::Api {
                server,
                skip_tls_validation,
            } => {
                handlers::api::handle_api(server, skip_tls_validation, &mut config, &config_path)
                    .await
            }
            Commands::Login {
                username,
                password,
                client_name,
                client_secret,
            } => {
                let credentials = handlers::auth::LoginCredentials {
                    username,
                    password,
                    client_name,
                    client_secret,
                };
                handlers::auth::handle_login(credentials, &mut config, &config_path).await
            }
            Commands::Logout => handlers::auth::handle_logout(&mut config, &config_path).await,
            Commands::Token => handlers::auth::handle_token(&mut config, &config_path).await,

            // Credentials
            Commands::Get { name, id } => {
                handlers::credentials::handle_get(name, id, &mut config, &config_path).await
            }
            Commands::Find { path, name_like } => {
                handlers::credentials::handle_find(path, name_like, json, &mut config, &config_path)
                    .await
            }
            Commands::Set {
                name,
                credential_type,
                value,
                no_overwrite,
            } => {
                let request = handlers::credentials::SetArgs {
                    name,
                    credential_type,
                    value,
                    no_overwrite,
                };
                handlers::credentials::handle_set(request, &mut config, &config_path).await
            }
            Commands::Regenerate { name } => {
                handlers::credentials::handle_regenerate(&name, &mut config, &config_path).await
            }
            Commands::Delete { name, path } => {
                handlers::credentials::handle_delete(name, path, json, &mut config, &config_path)
                    .await
            }

            // Permissions
            Commands::GetPermission { uuid, name } => {
                handlers::permissions::handle_get_permission(uuid, name, &mut config, &config_path)
                    .await
            }
            Commands::SetPermission {
                path,
                actor,
                operations,
            } => {
                handlers::permissions::handle_set_permission(
                    &path,
                    &actor,
                    &operations,
                    json,
                    &mut config,
                    &config_path,
                )
                .await
            }

            Commands::Version => {
                handlers::version::handle_version(json, &mut config, &config_path).await
            }
        }
    }
}
