//! Token issuer boundary and the UAA implementation
//!
//! The issuer performs the three OAuth2 grants the auth strategy needs. The
//! UAA client posts form-encoded grants to `<auth_url>/oauth/token`.

use super::types::{AuthError, AuthResult, TokenSet};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

/// Something that can issue OAuth2 tokens
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Resource owner password grant
    async fn password_grant(
        &self,
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
    ) -> AuthResult<TokenSet>;

    /// Exchange a refresh token for a new token pair
    async fn refresh_grant(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> AuthResult<TokenSet>;

    /// Client credentials grant
    async fn client_credentials_grant(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> AuthResult<TokenSet>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// UAA token endpoint client
#[derive(Debug, Clone)]
pub struct UaaClient {
    auth_url: String,
    http: reqwest::Client,
}

impl UaaClient {
    pub fn new(auth_url: impl Into<String>, http: reqwest::Client) -> Self {
        let auth_url = auth_url.into().trim_end_matches('/').to_string();
        Self { auth_url, http }
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth/token", self.auth_url)
    }

    async fn grant(&self, form: &[(&str, &str)]) -> AuthResult<TokenSet> {
        let response = self
            .http
            .post(self.token_endpoint())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Failed to read token response: {}", e)))?;

        if !status.is_success() {
            let parsed: TokenErrorResponse = serde_json::from_slice(&body).unwrap_or_default();
            let description = if parsed.error_description.is_empty() {
                format!(
                    "Token request failed with status {}: {}",
                    status,
                    String::from_utf8_lossy(&body)
                )
            } else {
                parsed.error_description
            };
            return Err(AuthError::GrantRejected {
                status: status.as_u16(),
                error: parsed.error,
                description,
            });
        }

        let token_response: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            AuthError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;

        Ok(TokenSet::new(
            token_response.access_token,
            token_response.refresh_token.unwrap_or_default(),
        ))
    }
}

#[async_trait]
impl TokenIssuer for UaaClient {
    async fn password_grant(
        &self,
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
    ) -> AuthResult<TokenSet> {
        debug!("Requesting password grant for {}", username);
        let tokens = self
            .grant(&[
                ("grant_type", "password"),
                ("response_type", "token"),
                ("username", username),
                ("password", password),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .await?;
        info!("Password grant completed successfully");
        Ok(tokens)
    }

    async fn refresh_grant(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> AuthResult<TokenSet> {
        debug!("Refreshing access token");
        let tokens = self
            .grant(&[
                ("grant_type", "refresh_token"),
                ("response_type", "token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .await?;
        info!("Token refresh completed successfully");
        Ok(tokens)
    }

    async fn client_credentials_grant(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> AuthResult<TokenSet> {
        debug!("Requesting client credentials grant for {}", client_id);
        let tokens = self
            .grant(&[
                ("grant_type", "client_credentials"),
                ("response_type", "token"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .await?;
        info!("Client credentials grant completed successfully");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> UaaClient {
        UaaClient::new(server.uri(), reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_password_grant_posts_form() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=user-name"))
            .and(body_string_contains("client_id=credhub_cli"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "new-access-token",
                "refresh_token": "new-refresh-token",
                "token_type": "bearer",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let tokens = client(&mock_server)
            .password_grant("credhub_cli", "", "user-name", "user-password")
            .await
            .unwrap();

        assert_eq!(tokens, TokenSet::new("new-access-token", "new-refresh-token"));
    }

    #[tokio::test]
    async fn test_client_credentials_without_refresh_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "client-token",
                "token_type": "bearer",
            })))
            .mount(&mock_server)
            .await;

        let tokens = client(&mock_server)
            .client_credentials_grant("client-id", "client-secret")
            .await
            .unwrap();

        assert_eq!(tokens.access_token, "client-token");
        assert!(tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_grant_surfaces_description() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_token",
                "error_description": "Invalid refresh token (expired)",
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .refresh_grant("credhub_cli", "", "stale")
            .await
            .unwrap_err();

        match err {
            AuthError::GrantRejected {
                status,
                error,
                description,
            } => {
                assert_eq!(status, 401);
                assert_eq!(error, "invalid_token");
                assert_eq!(description, "Invalid refresh token (expired)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
