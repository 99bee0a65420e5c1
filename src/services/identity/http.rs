//! reqwest-backed Identity Service client.
//!
//! Endpoints:
//! - `GET  {base}/users/me`   (Authorization: Bearer <token>) -> User
//! - `POST {base}/auth/login` ({username, password})           -> {token}
//!
//! The client carries its own timeout; an elapsed timeout surfaces as
//! `IdentityError::Transport` like any other transport failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::{IdentityError, IdentityResult, IdentityService, User};

#[derive(Clone, Debug)]
pub struct HttpIdentityService {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

// message は string / string[] のどちらでも返ってくる
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

#[derive(Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<ErrorMessage>,
    #[serde(default)]
    errors: Option<Map<String, Value>>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<String> {
        match self.message {
            Some(ErrorMessage::One(m)) if !m.is_empty() => return Some(m),
            Some(ErrorMessage::Many(ms)) if !ms.is_empty() => return Some(ms.join(", ")),
            _ => {}
        }

        let field_errors = self
            .errors?
            .into_values()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Vec<_>>();

        (!field_errors.is_empty()).then(|| field_errors.join(", "))
    }
}

impl HttpIdentityService {
    /// `base_url` must not end with `/`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> IdentityResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    async fn rejection(response: Response) -> IdentityError {
        let status = response.status();
        let body = response
            .json::<ErrorResponse>()
            .await
            .unwrap_or_default();

        IdentityError::Rejected {
            status: status.as_u16(),
            message: body
                .into_message()
                .unwrap_or_else(|| default_message(status)),
        }
    }
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn whoami(&self, token: &str) -> IdentityResult<User> {
        let response = self
            .client
            .get(format!("{}/users/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json::<User>()
            .await
            .map_err(|e| IdentityError::InvalidBody(e.to_string()))
    }

    async fn login(&self, username: &str, password: &str) -> IdentityResult<String> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body = response
            .json::<LoginResponse>()
            .await
            .map_err(|e| IdentityError::InvalidBody(e.to_string()))?;

        if body.token.is_empty() {
            return Err(IdentityError::InvalidBody("empty token".to_string()));
        }
        Ok(body.token)
    }
}
