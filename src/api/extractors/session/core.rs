use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::gate::RequestContext;
use crate::services::identity::User;

/// Handler で RequestContext を受け取るための extractor
/// session gate が request.extensions() に insert 済みである前提
/// 見つからない場合は 401 (gate が掛かっていない route)
pub struct Session(pub RequestContext);

/// 認証済み user だけを受け取る extractor
/// auth subtree の handler など、未認証でも到達する route で使う
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(Session)
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .filter(|ctx| ctx.is_authenticated())
            .and_then(|ctx| ctx.user.clone())
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
