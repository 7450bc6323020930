//! Integration tests for the CredHub SDK

use credhub_sdk::{ApiError, ClientBuilder, CredHubClient, GrantParameters, TokenSet};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ClientBuilder {
    ClientBuilder::new()
        .base_url(server.uri())
        .auth_url(server.uri())
        .timeout(Duration::from_secs(5))
        .grant_parameters(GrantParameters::client_credentials("client-id", "client-secret"))
        .with_tokens("test-token", "")
}

async fn mount_info(server: &MockServer, version: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "app": {"name": "CredHub", "version": version},
            "auth-server": {"url": server.uri()}
        })))
        .expect(times)
        .mount(server)
        .await;
}

fn listing(names: &[&str]) -> serde_json::Value {
    let credentials: Vec<_> = names
        .iter()
        .map(|name| json!({"name": name, "version_created_at": "2017-01-01T04:07:18Z"}))
        .collect();
    json!({ "credentials": credentials })
}

#[tokio::test]
async fn test_client_creation() {
    let client = ClientBuilder::new()
        .base_url("https://credhub.example.com:8844")
        .auth_url("https://uaa.example.com:8443")
        .skip_tls_validation(true)
        .build();

    assert!(client.is_ok());
}

#[tokio::test]
async fn test_add_permission_on_legacy_server() {
    let mock_server = MockServer::start().await;
    mount_info(&mock_server, "1.9.0", 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/permissions"))
        .and(body_json(json!({
            "credential_name": "/p",
            "permissions": [{"actor": "a", "operations": ["read"]}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let created = client
        .add_permission("/p", "a", &["read".to_string()])
        .await
        .unwrap();

    assert!(created.is_none());
}

#[tokio::test]
async fn test_add_permission_on_current_server() {
    let mock_server = MockServer::start().await;
    mount_info(&mock_server, "2.0.0", 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v2/permissions"))
        .and(body_json(json!({"actor": "a", "operations": ["read"], "path": "/p"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "actor": "a",
            "operations": ["read"],
            "path": "/p",
            "uuid": "1234"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let created = client
        .add_permission("/p", "a", &["read".to_string()])
        .await
        .unwrap()
        .unwrap();

    assert_eq!(created.uuid.as_deref(), Some("1234"));
    assert_eq!(created.path.as_deref(), Some("/p"));
}

#[tokio::test]
async fn test_version_discovered_once_per_client() {
    let mock_server = MockServer::start().await;
    mount_info(&mock_server, "2.0.0", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/permissions/1234"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "actor": "some-actor",
            "operations": ["read", "write"],
            "path": "/some-path/*",
            "uuid": "1234"
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let first = client.get_permission("1234").await.unwrap();
    let second = client.get_permission("1234").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.actor, "some-actor");
    assert_eq!(client.cached_server_version().await.as_deref(), Some("2.0.0"));
}

#[tokio::test]
async fn test_unparseable_server_version_fails_permission_calls() {
    let mock_server = MockServer::start().await;
    mount_info(&mock_server, "not-a-version", 1).await;

    let client = client_for(&mock_server).build().unwrap();
    let err = client.get_permission("1234").await.unwrap_err();

    assert!(matches!(err, ApiError::VersionParse { .. }));
}

#[tokio::test]
async fn test_delete_by_path_collects_item_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/data"))
        .and(query_param("path", "/some/path"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(&[
                "/some/path/one",
                "/some/path/two",
                "/some/path/three",
            ])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    for name in ["/some/path/one", "/some/path/three"] {
        Mock::given(method("DELETE"))
            .and(path("/api/v1/data"))
            .and(query_param("name", name))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/api/v1/data"))
        .and(query_param("name", "/some/path/two"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let mut deleted = Vec::new();
    let failures = client
        .delete_by_path("/some/path", |name| deleted.push(name.to_string()))
        .await
        .unwrap();

    assert_eq!(deleted, vec!["/some/path/one", "/some/path/three"]);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "/some/path/two");
    assert!(failures[0]
        .error
        .starts_with("The response body could not be decoded: "));
}

#[tokio::test]
async fn test_delete_by_path_listing_failure_deletes_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/data"))
        .and(query_param("path", "/some/path"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": "listing not permitted"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let err = client
        .delete_by_path("/some/path", |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 403, .. }));
    assert_eq!(err.to_string(), "listing not permitted");
}

#[tokio::test]
async fn test_expired_token_is_refreshed_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/data"))
        .and(header("Authorization", "Bearer old-access-token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "access_token_expired"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/data"))
        .and(header("Authorization", "Bearer new-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["/a"])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access-token",
            "refresh_token": "new-refresh-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client: CredHubClient = client_for(&mock_server)
        .with_tokens("old-access-token", "old-refresh-token")
        .build()
        .unwrap();

    let results = client.find_by_path("/").await.unwrap();

    assert_eq!(results.credentials[0].name, "/a");
    assert_eq!(
        client.tokens().await,
        Some(TokenSet::new("new-access-token", "new-refresh-token"))
    );
}

#[tokio::test]
async fn test_login_without_token_uses_client_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "client-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_tokens("", "").build().unwrap();
    client.login().await.unwrap();
    client.login().await.unwrap();

    assert_eq!(client.tokens().await, Some(TokenSet::new("client-token", "")));
}

#[tokio::test]
async fn test_unauthorized_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/data"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_token",
            "error_description": "Full authentication is required to access this resource"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let err = client.get_by_name("/example").await.unwrap_err();

    assert!(err.is_unauthorized());
}
