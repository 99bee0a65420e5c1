//! Identity Service interface used by the session gate and the auth handlers.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Failures talking to the Identity Service.
///
/// Note:
/// - The gate collapses every variant into "invalid session". Only the login
///   handler looks at `Rejected { message }` to show it to the user.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("identity service returned an invalid body: {0}")]
    InvalidBody(String),
}

/// User profile as returned by `GET /users/me`.
///
/// Only `id` is read by the gate; every other field is kept as-is for handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    pub fn is_identified(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Remote identity provider.
///
/// Implementations must be cheap to share (`Arc<dyn IdentityService>`).
#[async_trait]
pub trait IdentityService: Send + Sync + 'static {
    // Resolve a bearer token to the user it belongs to.
    async fn whoami(&self, token: &str) -> IdentityResult<User>;

    // Exchange credentials for a new session token.
    async fn login(&self, username: &str, password: &str) -> IdentityResult<String>;
}
