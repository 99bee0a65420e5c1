//! Per-request session state passed from the gate to downstream handlers,
//! and the response part handlers use to hand a token change back.

use std::convert::Infallible;

use axum::response::{IntoResponseParts, ResponseParts};

use crate::services::identity::User;

/// Request-scoped session state.
///
/// Built fresh by the gate for every request and inserted into the request
/// extensions. `token` is empty whenever the request is not authenticated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub token: String,
    pub user: Option<User>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_identified)
    }

    /// Token the client should hold once `update` (if any) is applied.
    pub fn token_after(&self, update: Option<SessionUpdate>) -> String {
        match update {
            Some(SessionUpdate::Set(token)) => token,
            Some(SessionUpdate::Clear) => String::new(),
            None => self.token.clone(),
        }
    }
}

/// Token change requested by a downstream handler (login / logout).
///
/// Returned as part of the response:
/// ```ignore
/// (SessionUpdate::Clear, Redirect::to("/auth/login"))
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Set(String),
    Clear,
}

impl IntoResponseParts for SessionUpdate {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.extensions_mut().insert(self);
        Ok(res)
    }
}
