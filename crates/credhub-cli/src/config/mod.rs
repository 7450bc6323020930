//! Configuration management for the CredHub CLI
//!
//! The configuration holds the targeted server, the token issuer URL and the
//! token pair from the last command. It is loaded once per invocation from
//! defaults, the TOML file and `CREDHUB_` environment variables, handed to
//! the SDK as a snapshot, and written back when the tokens change.

use crate::error::{CliError, Result};
use credhub_common::ConfigurationError;
use credhub_sdk::{GrantParameters, TokenSet, DEFAULT_CLIENT_ID};
use etcetera::{choose_base_strategy, BaseStrategy};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Short `CREDHUB_` variable names and the keys they set
const SHORT_ENV_KEYS: [(&str, &str); 3] = [
    ("client", "client_id"),
    ("secret", "client_secret"),
    ("server", "api_url"),
];

/// CLI configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Targeted CredHub API URL
    #[serde(default)]
    pub api_url: String,

    /// Token issuer advertised by the server
    #[serde(default)]
    pub auth_url: String,

    #[serde(default)]
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    #[serde(default)]
    pub skip_tls_validation: bool,

    /// OAuth client id, `credhub_cli` for user logins
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Only ever read from the environment
    #[serde(default, skip_serializing)]
    pub client_secret: String,
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            auth_url: String::new(),
            access_token: String::new(),
            refresh_token: String::new(),
            skip_tls_validation: false,
            client_id: default_client_id(),
            client_secret: String::new(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the default location
    pub fn load_default() -> Result<Self> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// Load configuration from a specific file, then the environment
    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        Self::extract(Self::figment(path).merge(env_provider()))
    }

    /// Load only defaults and the file, ignoring the environment
    pub fn load_file_only(path: &Path) -> Result<Self> {
        Self::extract(Self::figment(path))
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(CliConfig::default())).merge(Toml::file(path))
    }

    fn extract(figment: Figment) -> Result<Self> {
        figment.extract().map_err(|e| {
            CliError::Config(ConfigurationError::ParseError {
                details: e.to_string(),
            })
        })
    }

    /// Save configuration to a specific path
    pub async fn save_to_path(&self, path: &Path) -> Result<()> {
        debug!("Saving configuration to: {}", path.display());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ConfigurationError::Io)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::internal(format!("Failed to serialize config: {e}")))?;

        tokio::fs::write(path, content)
            .await
            .map_err(ConfigurationError::Io)?;

        info!("Configuration saved successfully");
        Ok(())
    }

    /// Get configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let strategy = choose_base_strategy().map_err(|e| {
            CliError::internal(format!("Failed to determine base directories: {}", e))
        })?;
        Ok(strategy.config_dir().join("credhub"))
    }

    /// Default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// The API URL, or the error telling the user to target a server
    pub fn require_api_url(&self) -> Result<&str> {
        if self.api_url.is_empty() {
            return Err(CliError::NoApiTarget);
        }
        Ok(&self.api_url)
    }

    pub fn tokens(&self) -> TokenSet {
        TokenSet::new(self.access_token.clone(), self.refresh_token.clone())
    }

    pub fn set_tokens(&mut self, tokens: TokenSet) {
        self.access_token = tokens.access_token;
        self.refresh_token = tokens.refresh_token;
    }

    /// Mark the session ended so later commands refuse to reuse old tokens
    pub fn revoke_tokens(&mut self) {
        self.set_tokens(TokenSet::revoked());
    }

    /// Whether client credentials came from the environment
    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Grant parameters for a non-interactive command
    pub fn grant_parameters(&self) -> GrantParameters {
        GrantParameters::client_credentials(self.client_id.clone(), self.client_secret.clone())
    }
}

/// `CREDHUB_*` variables, with the short client/secret/server names mapped
/// onto their configuration keys
fn env_provider() -> Env {
    Env::prefixed("CREDHUB_").map(|key| {
        SHORT_ENV_KEYS
            .iter()
            .find(|(short, _)| key.as_str().eq_ignore_ascii_case(short))
            .map(|(_, full)| (*full).into())
            .unwrap_or_else(|| key.as_str().into())
    })
}
