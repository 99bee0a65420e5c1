/*
 * Responsibility
 * - GET /health (疎通用)
 * - session gate の外に置く (probe はセッションを持たない)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
