/*
 * Responsibility
 * - GET {base}/ , GET {base}/users/me
 * - gate が解決した user をそのまま返す (Identity Service の profile を passthrough)
 */
use axum::Json;

use crate::api::extractors::CurrentUser;
use crate::services::identity::User;

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
