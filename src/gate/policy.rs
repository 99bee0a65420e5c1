//! Access policy: who may reach the downstream handler, and where the rest go.

use axum::http::Uri;

use super::GateConfig;

/// Why an unauthenticated request is sent to the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No token at all.
    NoCredentials,
    /// Token present but rejected, expired, or unverifiable.
    InvalidCredentials,
}

impl DenyReason {
    /// Text shown on the login page.
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NoCredentials => "You need to login to access this page.",
            DenyReason::InvalidCredentials => {
                "Your session has expired or is no longer valid. Please login again."
            }
        }
    }

    pub(crate) fn for_token(original_token: &str) -> Self {
        if original_token.is_empty() {
            DenyReason::NoCredentials
        } else {
            DenyReason::InvalidCredentials
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    RedirectToLogin { next: String, reason: DenyReason },
}

impl GateConfig {
    /// `{base}/auth` itself or anything below it. `{base}/authors` is not.
    pub fn is_auth_path(&self, path: &str) -> bool {
        let prefix = self.auth_prefix();
        match path.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// `Location` of the login redirect.
    pub fn login_location(&self, next: &str, reason: DenyReason) -> String {
        format!(
            "{}?next={}&reason={}",
            self.login_path(),
            urlencoding::encode(next),
            urlencoding::encode(reason.message()),
        )
    }
}

/// Original path plus query, as sent back through `next`.
pub fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}
