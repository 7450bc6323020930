//! Raw HTTP exchange with the CredHub API
//!
//! A [`Transport`] performs exactly one request/response round trip with no
//! authentication or retry behaviour of its own. Responses are always fully
//! buffered so the underlying connection can be returned to the pool.

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout in seconds for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Immutable description of one logical API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`
    pub path: String,
    /// Query parameters, encoded by the transport
    pub query: Vec<(String, String)>,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
    bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body
    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest {
            message: format!("Failed to serialize request body: {e}"),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Fresh copy of this request carrying the given bearer token
    pub fn with_bearer(&self, token: &str) -> Self {
        let mut request = self.clone();
        request.bearer = Some(token.to_string());
        request
    }

    /// Bearer token attached to this request, if any
    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }
}

/// Raw, fully buffered result of one HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Convenience constructor for a JSON body
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as UTF-8 text, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A bare HTTP-exchange capability with no auth or retry semantics
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the request once and return the buffered response
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse>;
}

/// HTTP client settings shared by the API transport and the token issuer
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub skip_tls_validation: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            skip_tls_validation: false,
        }
    }
}

impl HttpOptions {
    /// Build a reqwest client honouring these options
    pub fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.skip_tls_validation)
            .build()
            .map_err(|e| ApiError::Config {
                message: format!("Failed to create HTTP client: {e}"),
            })
    }
}

/// [`Transport`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = request.bearer() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("{} {} -> {}", request.method, url, status);

        Ok(RawResponse { status, body })
    }
}
