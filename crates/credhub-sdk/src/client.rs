//! HTTP client for the CredHub API
//!
//! This module provides a type-safe client for interacting with a CredHub
//! server. Requests flow through the auth strategy, which attaches and
//! refreshes bearer tokens, and the dispatcher, which maps responses to
//! domain results.
//!
//! # Authentication
//!
//! The client authenticates against the UAA server advertised by `/info`:
//! - A held refresh token is always exchanged first
//! - Otherwise a public client with username and password uses the password grant
//! - Otherwise the client credentials grant is used
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use credhub_sdk::{ClientBuilder, GrantParameters};
//!
//! # async fn example() -> credhub_sdk::Result<()> {
//! let client = ClientBuilder::new()
//!     .base_url("https://credhub.example.com:8844")
//!     .auth_url("https://uaa.example.com:8443")
//!     .grant_parameters(GrantParameters::client_credentials("director", "secret"))
//!     .build()?;
//!
//! let credential = client.get_by_name("/example-password").await?;
//! println!("{}", credential.value);
//!
//! let failures = client
//!     .delete_by_path("/old", |name| println!("Deleted {name}"))
//!     .await?;
//! for failure in failures {
//!     eprintln!("{}: {}", failure.name, failure.error);
//! }
//! # Ok(())
//! # }
//! ```

use crate::{
    auth::{
        AuthStrategy, GrantParameters, OAuthStrategy, TokenIssuer, TokenSet, UaaClient,
    },
    bulk::{self, DeleteFailure},
    dispatcher::RequestDispatcher,
    error::{ApiError, Result},
    transport::{ApiRequest, HttpOptions, HttpTransport, Transport},
    types::{
        Credential, CredentialList, FindResults, OverwriteMode, Permission, PermissionEntry,
        RegenerateRequest, ServerInfo, SetCredentialRequest, V1Permissions, V2PermissionRequest,
        VersionResponse,
    },
    version::{ApiGeneration, VersionGate, VersionSource},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Client id used by the command line client when none is configured
pub const DEFAULT_CLIENT_ID: &str = "credhub_cli";

const DATA_PATH: &str = "/api/v1/data";
const V1_PERMISSIONS_PATH: &str = "/api/v1/permissions";
const V2_PERMISSIONS_PATH: &str = "/api/v2/permissions";

/// HTTP client for interacting with a CredHub server
#[derive(Debug)]
pub struct CredHubClient {
    base_url: String,
    dispatcher: RequestDispatcher,
    version_gate: VersionGate,
}

impl CredHubClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Server Discovery =====

    /// Unauthenticated server information
    pub async fn server_info(&self) -> Result<ServerInfo> {
        self.dispatcher
            .call_unauthenticated(&ApiRequest::get("/info"))
            .await
    }

    /// URL of the token issuer the server trusts
    pub async fn auth_url(&self) -> Result<String> {
        let info = self.server_info().await?;
        if info.auth_server.url.is_empty() {
            return Err(ApiError::Config {
                message: "The server did not advertise an auth server URL".into(),
            });
        }
        Ok(info.auth_server.url)
    }

    /// Server version, from `/info` or the authenticated `/version` endpoint
    pub async fn server_version(&self) -> Result<String> {
        let info = self.server_info().await?;
        if !info.app.version.is_empty() {
            return Ok(info.app.version);
        }

        debug!("/info carries no version, asking /version");
        let response: VersionResponse = self.dispatcher.call(&ApiRequest::get("/version")).await?;
        Ok(response.version)
    }

    /// Version string cached by the version gate, if discovered yet
    pub async fn cached_server_version(&self) -> Option<String> {
        self.version_gate.cached().await
    }

    /// API generation of the server, discovering the version on first use
    pub async fn api_generation(&self) -> Result<ApiGeneration> {
        self.version_gate.resolve_api_generation(self).await
    }

    // ===== Credentials =====

    /// Current version of the named credential
    pub async fn get_by_name(&self, name: &str) -> Result<Credential> {
        let request = ApiRequest::get(DATA_PATH)
            .with_query("name", name)
            .with_query("current", "true");
        let list: CredentialList = self.dispatcher.call(&request).await?;

        list.data.into_iter().next().ok_or_else(|| ApiError::NotFound {
            resource: name.to_string(),
        })
    }

    /// Credential version by id
    pub async fn get_by_id(&self, id: &str) -> Result<Credential> {
        let path = format!("{}/{}", DATA_PATH, urlencoding::encode(id));
        self.dispatcher.call(&ApiRequest::get(path)).await
    }

    /// Credentials stored under a path
    pub async fn find_by_path(&self, path: &str) -> Result<FindResults> {
        let request = ApiRequest::get(DATA_PATH).with_query("path", path);
        self.dispatcher.call(&request).await
    }

    /// Credentials whose name contains the given fragment
    pub async fn find_by_partial_name(&self, name_like: &str) -> Result<FindResults> {
        let request = ApiRequest::get(DATA_PATH).with_query("name-like", name_like);
        self.dispatcher.call(&request).await
    }

    /// Store a credential value of the given type
    pub async fn set_credential(
        &self,
        name: &str,
        credential_type: &str,
        value: Value,
        mode: Option<OverwriteMode>,
    ) -> Result<Credential> {
        let body = SetCredentialRequest {
            name: name.to_string(),
            credential_type: credential_type.to_string(),
            value,
            mode,
        };
        let request = ApiRequest::put(DATA_PATH).with_json(&body)?;
        self.dispatcher.call(&request).await
    }

    /// Have the server generate a new value for an existing credential
    pub async fn regenerate(&self, name: &str) -> Result<Credential> {
        let body = RegenerateRequest {
            name: name.to_string(),
            regenerate: true,
        };
        let request = ApiRequest::post(DATA_PATH).with_json(&body)?;
        self.dispatcher.call(&request).await
    }

    /// Delete all versions of a credential
    pub async fn delete_by_name(&self, name: &str) -> Result<()> {
        let request = ApiRequest::delete(DATA_PATH).with_query("name", name);
        self.dispatcher.call_empty(&request).await
    }

    /// Delete every credential under a path
    ///
    /// Fails only when the path cannot be listed. Individual delete failures
    /// are returned in listing order; `on_deleted` is called for each
    /// credential that was removed.
    pub async fn delete_by_path<F>(&self, path: &str, on_deleted: F) -> Result<Vec<DeleteFailure>>
    where
        F: FnMut(&str),
    {
        bulk::apply_to_each(
            self.find_by_path(path),
            |name| async move { self.delete_by_name(&name).await },
            on_deleted,
        )
        .await
    }

    // ===== Permissions =====

    /// Look up a permission
    ///
    /// Legacy servers take a credential name and answer with the first
    /// permission on it; current servers take the permission uuid.
    pub async fn get_permission(&self, name_or_uuid: &str) -> Result<Permission> {
        match self.api_generation().await? {
            ApiGeneration::Legacy => {
                let request =
                    ApiRequest::get(V1_PERMISSIONS_PATH).with_query("credential_name", name_or_uuid);
                let response: V1Permissions = self.dispatcher.call(&request).await?;

                let V1Permissions {
                    credential_name,
                    permissions,
                } = response;
                let entry = permissions.into_iter().next().ok_or_else(|| ApiError::NotFound {
                    resource: format!("permission on {name_or_uuid}"),
                })?;
                Ok(Permission {
                    actor: entry.actor,
                    operations: entry.operations,
                    path: Some(credential_name),
                    uuid: None,
                })
            }
            ApiGeneration::Current => {
                let path = format!(
                    "{}/{}",
                    V2_PERMISSIONS_PATH,
                    urlencoding::encode(name_or_uuid)
                );
                self.dispatcher.call(&ApiRequest::get(path)).await
            }
        }
    }

    /// Grant an actor operations on a path
    ///
    /// Legacy servers return nothing usable, so the result is `None` there.
    pub async fn add_permission(
        &self,
        path: &str,
        actor: &str,
        operations: &[String],
    ) -> Result<Option<Permission>> {
        match self.api_generation().await? {
            ApiGeneration::Legacy => {
                let body = V1Permissions {
                    credential_name: path.to_string(),
                    permissions: vec![PermissionEntry {
                        actor: actor.to_string(),
                        operations: operations.to_vec(),
                    }],
                };
                let request = ApiRequest::post(V1_PERMISSIONS_PATH).with_json(&body)?;
                self.dispatcher.call_empty(&request).await?;
                Ok(None)
            }
            ApiGeneration::Current => {
                let body = V2PermissionRequest {
                    path: path.to_string(),
                    actor: actor.to_string(),
                    operations: operations.to_vec(),
                };
                let request = ApiRequest::post(V2_PERMISSIONS_PATH).with_json(&body)?;
                let permission = self.dispatcher.call(&request).await?;
                Ok(Some(permission))
            }
        }
    }

    // ===== Authentication =====

    /// Acquire tokens unless an access token is already held
    pub async fn login(&self) -> Result<()> {
        Ok(self.oauth()?.login().await?)
    }

    /// Run a grant now, replacing the held tokens
    pub async fn refresh(&self) -> Result<()> {
        Ok(self.oauth()?.refresh().await?)
    }

    /// Snapshot of the held token pair, `None` without OAuth
    pub async fn tokens(&self) -> Option<TokenSet> {
        match self.dispatcher.auth().oauth() {
            Some(oauth) => Some(oauth.tokens().await),
            None => None,
        }
    }

    fn oauth(&self) -> Result<&OAuthStrategy> {
        self.dispatcher.auth().oauth().ok_or_else(|| ApiError::Config {
            message: "This client was built without authentication".into(),
        })
    }
}

#[async_trait]
impl VersionSource for CredHubClient {
    async fn server_version(&self) -> Result<String> {
        CredHubClient::server_version(self).await
    }
}

/// Builder for [`CredHubClient`]
///
/// Holds a read-once snapshot of the caller's configuration; the client never
/// reads configuration afterwards.
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_url: Option<String>,
    http: HttpOptions,
    grant: Option<GrantParameters>,
    tokens: TokenSet,
    no_auth: bool,
    transport: Option<Arc<dyn Transport>>,
    issuer: Option<Arc<dyn TokenIssuer>>,
    server_version: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CredHub API URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the token issuer URL
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Accept any server certificate
    pub fn skip_tls_validation(mut self, skip: bool) -> Self {
        self.http.skip_tls_validation = skip;
        self
    }

    /// Set the grant parameters used when no refresh token is held
    pub fn grant_parameters(mut self, grant: GrantParameters) -> Self {
        self.grant = Some(grant);
        self
    }

    /// Start from a previously stored token pair
    pub fn with_tokens(
        mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.tokens = TokenSet::new(access_token, refresh_token);
        self
    }

    /// Send requests without credentials
    pub fn no_auth(mut self) -> Self {
        self.no_auth = true;
        self
    }

    /// Replace the HTTP transport
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the token issuer
    pub fn with_token_issuer(mut self, issuer: Arc<dyn TokenIssuer>) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Seed the version cache, skipping discovery
    pub fn server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = Some(version.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CredHubClient> {
        let base_url = self.base_url.ok_or_else(|| ApiError::Config {
            message: "The CredHub API URL is not set".into(),
        })?;
        url::Url::parse(&base_url).map_err(|e| ApiError::Config {
            message: format!("Invalid API URL '{base_url}': {e}"),
        })?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let http_client = self.http.build_client()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(base_url.clone(), http_client.clone())),
        };

        let auth = if self.no_auth {
            AuthStrategy::NoAuth(transport)
        } else {
            if self.tokens.is_revoked() {
                return Err(ApiError::RevokedToken);
            }

            let issuer: Arc<dyn TokenIssuer> = match (self.issuer, self.auth_url) {
                (Some(issuer), _) => issuer,
                (None, Some(auth_url)) => Arc::new(UaaClient::new(auth_url, http_client)),
                (None, None) => {
                    return Err(ApiError::Config {
                        message: "The auth server URL is not set".into(),
                    })
                }
            };
            let grant = self
                .grant
                .unwrap_or_else(|| GrantParameters::password(DEFAULT_CLIENT_ID, "", ""));

            AuthStrategy::OAuth(OAuthStrategy::new(grant, self.tokens, issuer, transport))
        };

        let version_gate = match self.server_version {
            Some(version) => VersionGate::with_cached(version),
            None => VersionGate::new(),
        };

        Ok(CredHubClient {
            base_url,
            dispatcher: RequestDispatcher::new(auth),
            version_gate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeIssuer;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CredHubClient {
        ClientBuilder::new()
            .base_url(server.uri())
            .with_tokens("test-token", "")
            .with_token_issuer(Arc::new(FakeIssuer::failing("unexpected grant")))
            .build()
            .unwrap()
    }

    fn credential_json(name: &str) -> serde_json::Value {
        json!({
            "id": "5a2edd4f-1686-4c8d-80eb-5daa5d44d2b8",
            "name": name,
            "type": "password",
            "value": "some-password",
            "version_created_at": "2017-01-01T04:07:18Z"
        })
    }

    #[tokio::test]
    async fn test_get_by_name() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/data"))
            .and(query_param("name", "/example-password"))
            .and(query_param("current", "true"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [credential_json("/example-password")]})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let credential = client(&mock_server)
            .get_by_name("/example-password")
            .await
            .unwrap();

        assert_eq!(credential.name, "/example-password");
        assert_eq!(credential.credential_type, "password");
        assert_eq!(credential.value, json!("some-password"));
    }

    #[tokio::test]
    async fn test_get_by_name_with_no_versions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).get_by_name("/missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/data/some-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(credential_json("/by-id")))
            .mount(&mock_server)
            .await;

        let credential = client(&mock_server).get_by_id("some-id").await.unwrap();
        assert_eq!(credential.name, "/by-id");
    }

    #[tokio::test]
    async fn test_find_by_partial_name() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/data"))
            .and(query_param("name-like", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "credentials": [
                    {"name": "/a/password", "version_created_at": "2017-01-01T04:07:18Z"},
                    {"name": "/b/password", "version_created_at": "2017-01-02T04:07:18Z"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let results = client(&mock_server)
            .find_by_partial_name("password")
            .await
            .unwrap();

        let names: Vec<_> = results.credentials.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["/a/password", "/b/password"]);
    }

    #[tokio::test]
    async fn test_set_credential_sends_mode() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/data"))
            .and(body_json(json!({
                "name": "/example-password",
                "type": "password",
                "value": "some-password",
                "mode": "overwrite"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(credential_json("/example-password")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        client(&mock_server)
            .set_credential(
                "/example-password",
                "password",
                json!("some-password"),
                Some(OverwriteMode::Overwrite),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_regenerate() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/data"))
            .and(body_json(json!({"name": "/example-password", "regenerate": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(credential_json("/example-password")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let credential = client(&mock_server)
            .regenerate("/example-password")
            .await
            .unwrap();
        assert_eq!(credential.name, "/example-password");
    }

    #[tokio::test]
    async fn test_delete_by_name_error_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/data"))
            .and(query_param("name", "/example-password"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "The request could not be completed because the credential does not exist or you do not have sufficient authorization."
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .delete_by_name("/example-password")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The request could not be completed because the credential does not exist or you do not have sufficient authorization."
        );
    }

    #[tokio::test]
    async fn test_server_version_from_info() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "app": {"name": "CredHub", "version": "1.9.0"},
                "auth-server": {"url": "https://uaa.example.com"}
            })))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        assert_eq!(client.server_version().await.unwrap(), "1.9.0");
        assert_eq!(client.auth_url().await.unwrap(), "https://uaa.example.com");
    }

    #[tokio::test]
    async fn test_server_version_falls_back_to_version_endpoint() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "app": {"name": "CredHub"},
                "auth-server": {"url": "https://uaa.example.com"}
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/version"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "2.5.1"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert_eq!(client(&mock_server).server_version().await.unwrap(), "2.5.1");
    }

    #[tokio::test]
    async fn test_legacy_get_permission_returns_first_entry() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/permissions"))
            .and(query_param("credential_name", "/p"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "credential_name": "/p",
                "permissions": [
                    {"actor": "some-actor", "operations": ["read", "write"]},
                    {"actor": "other-actor", "operations": ["read"]}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::new()
            .base_url(mock_server.uri())
            .with_tokens("test-token", "")
            .with_token_issuer(Arc::new(FakeIssuer::failing("unexpected grant")))
            .server_version("1.9.0")
            .build()
            .unwrap();

        let permission = client.get_permission("/p").await.unwrap();
        assert_eq!(
            permission,
            Permission {
                actor: "some-actor".into(),
                operations: vec!["read".into(), "write".into()],
                path: Some("/p".into()),
                uuid: None,
            }
        );
    }

    #[test]
    fn test_build_requires_base_url() {
        let err = ClientBuilder::new().no_auth().build().unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));

        let err = ClientBuilder::new()
            .base_url("not a url")
            .no_auth()
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));
    }

    #[test]
    fn test_build_requires_auth_url_for_oauth() {
        let err = ClientBuilder::new()
            .base_url("https://credhub.example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("auth server URL"));
    }

    #[test]
    fn test_build_rejects_revoked_tokens() {
        let err = ClientBuilder::new()
            .base_url("https://credhub.example.com")
            .auth_url("https://uaa.example.com")
            .with_tokens("revoked", "revoked")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::RevokedToken));
    }

    #[tokio::test]
    async fn test_no_auth_client_has_no_tokens() {
        let client = ClientBuilder::new()
            .base_url("https://credhub.example.com")
            .no_auth()
            .build()
            .unwrap();

        assert!(client.tokens().await.is_none());
        assert!(matches!(client.login().await, Err(ApiError::Config { .. })));
    }
}
