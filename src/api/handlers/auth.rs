/*
 * Responsibility
 * - /auth 系 handler (auth subtree なので未認証でも到達する)
 *   - GET  /auth/login  : next / reason を返す
 *   - POST /auth/login  : Identity Service で login → token を SessionUpdate::Set で返す
 *   - POST /auth/logout : SessionUpdate::Clear
 * - Cookie は書かない。token の永続化は gate の finalize が行う
 */
use axum::{
    Form, Json,
    extract::{Query, State},
    response::Redirect,
};

use crate::{
    api::{
        dto::auth::{LoginForm, LoginPageQuery, LoginPageResponse},
        extractors::Session,
    },
    error::AppError,
    gate::{GateConfig, SessionUpdate},
    state::AppState,
};

/// `next` はアプリ内のパスだけを許可する (open redirect 対策)
/// - ブラウザは tab / 改行を URL から取り除くので、制御文字・空白・非 ASCII は一切許可しない
/// - Location ヘッダに載らない値もここで落ちる
fn safe_next(next: Option<&str>, config: &GateConfig) -> String {
    match next {
        Some(n)
            if n.chars().all(|c| c.is_ascii_graphic())
                && n.starts_with('/')
                && !n.starts_with("//")
                && !n.starts_with("/\\") =>
        {
            n.to_string()
        }
        _ => config.home_path(),
    }
}

pub async fn login_page(
    State(state): State<AppState>,
    Session(ctx): Session,
    Query(query): Query<LoginPageQuery>,
) -> Json<LoginPageResponse> {
    Json(LoginPageResponse {
        next: safe_next(query.next.as_deref(), state.gate.config()),
        reason: query.reason.unwrap_or_default(),
        authenticated: ctx.is_authenticated(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginPageQuery>,
    Form(form): Form<LoginForm>,
) -> Result<(SessionUpdate, Redirect), AppError> {
    form.validate()?;

    let token = state
        .identity
        .login(form.email.trim(), &form.password)
        .await?;

    let next = safe_next(query.next.as_deref(), state.gate.config());
    tracing::debug!(next = %next, "login succeeded");

    Ok((SessionUpdate::Set(token), Redirect::to(&next)))
}

pub async fn logout(State(state): State<AppState>) -> (SessionUpdate, Redirect) {
    (
        SessionUpdate::Clear,
        Redirect::to(&state.gate.config().login_path()),
    )
}
