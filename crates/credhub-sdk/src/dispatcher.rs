//! Request execution and response mapping
//!
//! The dispatcher sends an [`ApiRequest`] through the auth strategy and turns
//! the raw response into either a typed value or an [`ApiError`].

use crate::auth::AuthStrategy;
use crate::error::{ApiError, ErrorResponse, Result};
use crate::transport::{ApiRequest, RawResponse};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Executes requests and maps responses to domain results
#[derive(Debug)]
pub struct RequestDispatcher {
    auth: AuthStrategy,
}

impl RequestDispatcher {
    pub fn new(auth: AuthStrategy) -> Self {
        Self { auth }
    }

    pub fn auth(&self) -> &AuthStrategy {
        &self.auth
    }

    /// Execute without interpreting the status
    pub async fn send(&self, request: &ApiRequest, authenticated: bool) -> Result<RawResponse> {
        if authenticated {
            self.auth.do_request(request).await
        } else {
            self.auth.transport().execute(request).await
        }
    }

    /// Execute as the authenticated principal and decode a success body
    pub async fn call<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.send(request, true).await?;
        handle_response(response)
    }

    /// Execute without credentials and decode a success body
    pub async fn call_unauthenticated<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T> {
        let response = self.send(request, false).await?;
        handle_response(response)
    }

    /// Execute as the authenticated principal, ignoring a success body
    pub async fn call_empty(&self, request: &ApiRequest) -> Result<()> {
        let response = self.send(request, true).await?;
        check_status(response).map(|_| ())
    }
}

/// Decode a success body, or map the failure
pub fn handle_response<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
    let response = check_status(response)?;
    decode(&response)
}

/// Pass success responses through, map everything else to an error
pub fn check_status(response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(handle_error_response(&response))
}

/// Decode a body into the caller's shape
pub fn decode<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode {
        message: e.to_string(),
    })
}

fn handle_error_response(response: &RawResponse) -> ApiError {
    let status = response.status;
    let parsed = serde_json::from_slice::<ErrorResponse>(&response.body);

    if status == StatusCode::UNAUTHORIZED {
        let message = parsed
            .ok()
            .and_then(|body| body.error_description.or(body.error))
            .unwrap_or_else(|| "Authentication failed".into());
        return ApiError::Unauthorized { message };
    }

    match parsed {
        Ok(body) => ApiError::Server {
            status: status.as_u16(),
            message: body
                .error
                .unwrap_or_else(|| format!("Request failed with status {status}")),
        },
        Err(e) => ApiError::Decode {
            message: e.to_string(),
        },
    }
}
