//! Session gate as an axum middleware.
//!
//! Wraps a whole Router: every request goes through `SessionGate::handle`,
//! with `Next` as the downstream handler.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::state::AppState;

/// Put the session gate in front of every route of `router`.
///
/// 例：
/// ```ignore
/// let app = api::routes(config.gate_config());
/// let app = middleware::session::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn では State extractor を受け取れないため `from_fn_with_state` で渡す
    router.layer(middleware::from_fn_with_state(state, session_middleware))
}

async fn session_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    state.gate.handle(req, |req| next.run(req)).await
}
