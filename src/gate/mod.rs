/*!
 * Session gate
 *
 * Responsibility:
 * - cookie からセッショントークンを取り出し、Identity Service で user に解決する
 * - 未認証なら login ページへ 303 redirect (auth subtree は除外)
 * - 下流 handler の後でトークンが変わっていれば Set-Cookie を付与する
 *
 * Public API:
 * - SessionGate (handle / 各ステップ, Resolution, AccessDecision)
 * - GateConfig
 * - RequestContext, SessionUpdate
 * - cookie (parse_cookies / session_cookie)
 */

mod context;
pub mod cookie;
mod pipeline;
mod policy;

use std::time::Duration;

pub use context::{RequestContext, SessionUpdate};
pub use pipeline::SessionGate;

/// Session cookie lifetime (7 days).
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Construction-time settings of the gate.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Application mount prefix, `""` or `/something` without trailing `/`.
    pub base_path: String,
    pub session_max_age: Duration,
}

impl GateConfig {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            session_max_age: SESSION_MAX_AGE,
        }
    }

    /// Root of the paths exempt from the login redirect.
    pub fn auth_prefix(&self) -> String {
        format!("{}/auth", self.base_path)
    }

    pub fn login_path(&self) -> String {
        format!("{}/auth/login", self.base_path)
    }

    pub fn home_path(&self) -> String {
        format!("{}/", self.base_path)
    }
}
