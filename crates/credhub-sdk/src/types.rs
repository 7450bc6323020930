//! Type definitions for the CredHub SDK

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Credentials

/// One stored credential version
///
/// The value is schema-free: its shape depends on `credential_type`
/// (`password`, `value`, `json`, `user`, `certificate`, `ssh`, `rsa`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_created_at: Option<DateTime<Utc>>,
}

/// `{"data": [...]}` wrapper returned by name lookups
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialList {
    #[serde(default)]
    pub data: Vec<Credential>,
}

/// Result of a find by path or by partial name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindResults {
    #[serde(default)]
    pub credentials: Vec<FoundCredential>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundCredential {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_created_at: Option<DateTime<Utc>>,
}

/// Whether a set may replace an existing credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwriteMode {
    Overwrite,
    NoOverwrite,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetCredentialRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<OverwriteMode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegenerateRequest {
    pub name: String,
    pub regenerate: bool,
}

// Permissions

/// Access granted to one actor
///
/// `path` and `uuid` are only present on current-generation servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub actor: String,
    pub operations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// Actor/operations pair used inside legacy permission bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub actor: String,
    pub operations: Vec<String>,
}

/// Legacy `{credential_name, permissions}` shape, used for both directions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V1Permissions {
    pub credential_name: String,
    #[serde(default)]
    pub permissions: Vec<PermissionEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct V2PermissionRequest {
    pub path: String,
    pub actor: String,
    pub operations: Vec<String>,
}

// Server discovery

/// `GET /info` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub app: AppInfo,
    #[serde(rename = "auth-server", default)]
    pub auth_server: AuthServerInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthServerInfo {
    #[serde(default)]
    pub url: String,
}

/// `GET /version` response
#[derive(Debug, Clone, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}
