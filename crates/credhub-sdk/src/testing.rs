//! In-memory transport and issuer doubles for unit tests

use crate::auth::{AuthError, AuthResult, TokenIssuer, TokenSet};
use crate::error::{ApiError, Result};
use crate::transport::{ApiRequest, RawResponse, Transport};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&ApiRequest) -> Result<RawResponse> + Send + Sync>;

/// Transport answering from a closure and recording every request it sees
pub struct RecordingTransport {
    responder: Responder,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<RawResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same status and body
    pub fn always(status: StatusCode, body: &'static str) -> Self {
        Self::new(move |_| Ok(RawResponse::new(status, body)))
    }

    /// Always fail with a network error
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_| {
            Err(ApiError::Network {
                message: message.to_string(),
            })
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

/// Body the API returns when the bearer token has expired
pub const EXPIRED_BODY: &str = r#"{"error": "access_token_expired"}"#;

/// Grant call captured by [`FakeIssuer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantCall {
    Password {
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
    },
    Refresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
}

/// Issuer that hands out a fixed token pair, or a fixed error
pub struct FakeIssuer {
    tokens: TokenSet,
    error: Option<String>,
    calls: Mutex<Vec<GrantCall>>,
}

impl FakeIssuer {
    pub fn issuing(access_token: &str, refresh_token: &str) -> Self {
        Self {
            tokens: TokenSet::new(access_token, refresh_token),
            error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            tokens: TokenSet::default(),
            error: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GrantCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: GrantCall, refresh_token: Option<&str>) -> AuthResult<TokenSet> {
        self.calls.lock().unwrap().push(call);
        if let Some(message) = &self.error {
            return Err(AuthError::GrantRejected {
                status: 401,
                error: "invalid_grant".into(),
                description: message.clone(),
            });
        }
        let mut tokens = self.tokens.clone();
        if refresh_token.is_none() {
            // client credentials grants never carry a refresh token
            tokens.refresh_token.clear();
        }
        Ok(tokens)
    }
}

#[async_trait]
impl TokenIssuer for FakeIssuer {
    async fn password_grant(
        &self,
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
    ) -> AuthResult<TokenSet> {
        self.answer(
            GrantCall::Password {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                username: username.into(),
                password: password.into(),
            },
            Some(""),
        )
    }

    async fn refresh_grant(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> AuthResult<TokenSet> {
        self.answer(
            GrantCall::Refresh {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                refresh_token: refresh_token.into(),
            },
            Some(refresh_token),
        )
    }

    async fn client_credentials_grant(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> AuthResult<TokenSet> {
        self.answer(
            GrantCall::ClientCredentials {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
            },
            None,
        )
    }
}
