/*
 * Responsibility
 * - gate の後ろに置く URL 構造を定義 ({base} 配下)
 * - {base}/auth 配下は auth subtree (未認証でも到達)
 * - /health は app.rs で gate の外に置く
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    auth::{login, login_page, logout},
    me::me,
};
use crate::gate::GateConfig;
use crate::state::AppState;

pub fn routes(config: &GateConfig) -> Router<AppState> {
    let base = &config.base_path;

    let router = Router::new()
        .route(&format!("{base}/"), get(me))
        .route(&format!("{base}/users/me"), get(me))
        .route(&config.login_path(), get(login_page).post(login))
        .route(&format!("{base}/auth/logout"), post(logout));

    // "/app" と "/app/" の両方で home に到達させる
    if base.is_empty() {
        router
    } else {
        router.route(base, get(me))
    }
}
