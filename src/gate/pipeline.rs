//! The request pipeline: extract -> resolve -> authorize -> delegate -> finalize.
//!
//! Each step is a plain method so it can be exercised on its own; `handle`
//! only wires them together. Nothing here holds state across requests.

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request, Uri, header},
    response::{IntoResponse, Redirect, Response},
};

use super::context::{RequestContext, SessionUpdate};
use super::cookie;
use super::policy::{AccessDecision, DenyReason, path_and_query};
use super::GateConfig;
use crate::services::identity::IdentityService;

/// Outcome of looking up the extracted token.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No token was sent; the Identity Service was not called.
    Anonymous,
    /// The token was refused, or the lookup failed. The token is dropped.
    Rejected,
    Authenticated(RequestContext),
}

impl Resolution {
    pub fn into_context(self) -> RequestContext {
        match self {
            Resolution::Authenticated(ctx) => ctx,
            Resolution::Anonymous | Resolution::Rejected => RequestContext::anonymous(),
        }
    }
}

#[derive(Clone)]
pub struct SessionGate {
    identity: Arc<dyn IdentityService>,
    config: GateConfig,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    pub fn new(identity: Arc<dyn IdentityService>, config: GateConfig) -> Self {
        Self { identity, config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Step 1: session token from the `Cookie` header(s), `""` if none.
    pub fn extract_token(&self, headers: &HeaderMap) -> String {
        cookie::token_from_headers(headers)
    }

    /// Step 2: ask the Identity Service who owns `token`.
    ///
    /// Never fails: every identity error degrades to `Rejected`.
    pub async fn resolve(&self, token: &str) -> Resolution {
        if token.is_empty() {
            return Resolution::Anonymous;
        }

        match self.identity.whoami(token).await {
            Ok(user) if user.is_identified() => {
                Resolution::Authenticated(RequestContext::authenticated(token, user))
            }
            Ok(_) => {
                tracing::warn!("identity service returned a user without id");
                Resolution::Rejected
            }
            Err(err) => {
                tracing::warn!(error = %err, "session token rejected");
                Resolution::Rejected
            }
        }
    }

    /// Step 3: allow, or send the client to the login page.
    pub fn authorize(
        &self,
        original_token: &str,
        ctx: &RequestContext,
        uri: &Uri,
    ) -> AccessDecision {
        if ctx.is_authenticated() || self.config.is_auth_path(uri.path()) {
            return AccessDecision::Allow;
        }

        AccessDecision::RedirectToLogin {
            next: path_and_query(uri),
            reason: DenyReason::for_token(original_token),
        }
    }

    /// Step 5: persist a token change made during the request.
    ///
    /// `current` is the token the client should hold after this request.
    pub fn finalize(&self, original_token: &str, current: &str, response: &mut Response) {
        if current == original_token {
            return;
        }

        match cookie::session_cookie(current, self.config.session_max_age) {
            Some(value) => {
                tracing::debug!(cleared = current.is_empty(), "session token rotated");
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            None => {
                tracing::error!("session token is not a valid cookie value; not persisted");
            }
        }
    }

    /// Run the whole pipeline around `resolver` (the downstream handler).
    pub async fn handle<F, Fut>(&self, mut req: Request<Body>, resolver: F) -> Response
    where
        F: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        let original_token = self.extract_token(req.headers());
        let ctx = self.resolve(&original_token).await.into_context();

        if let AccessDecision::RedirectToLogin { next, reason } =
            self.authorize(&original_token, &ctx, req.uri())
        {
            tracing::debug!(?reason, next = %next, "redirecting to login");
            return Redirect::to(&self.config.login_location(&next, reason)).into_response();
        }

        // Step 4
        req.extensions_mut().insert(ctx.clone());
        let mut response = resolver(req).await;

        let update = response.extensions_mut().remove::<SessionUpdate>();
        let current = ctx.token_after(update);
        self.finalize(&original_token, &current, &mut response);

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::http::{HeaderValue, StatusCode};

    use crate::services::identity::HttpIdentityService;
    use crate::services::identity::fake::{FakeIdentity, user};

    fn build_gate(identity: FakeIdentity) -> (SessionGate, Arc<FakeIdentity>) {
        let identity = Arc::new(identity);
        (
            SessionGate::new(identity.clone(), GateConfig::new("")),
            identity,
        )
    }

    fn request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn location(response: &Response) -> String {
        response.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn empty_token_skips_identity_call() {
        let (gate, identity) = build_gate(FakeIdentity::default().with_user("abc", user("u1")));
        assert_eq!(gate.resolve("").await, Resolution::Anonymous);
        assert_eq!(identity.whoami_calls(), 0);
    }

    #[tokio::test]
    async fn user_without_id_is_rejected() {
        let (gate, _) = build_gate(FakeIdentity::default().with_user("abc", user("")));
        assert_eq!(gate.resolve("abc").await, Resolution::Rejected);
    }

    #[tokio::test]
    async fn missing_cookie_redirects_without_calling_handler() {
        let (gate, _) = build_gate(FakeIdentity::default());
        let called = AtomicUsize::new(0);

        let response = gate
            .handle(request("/problems?page=2", None), |_| async {
                called.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            format!(
                "/auth/login?next=%2Fproblems%3Fpage%3D2&reason={}",
                urlencoding::encode(DenyReason::NoCredentials.message())
            )
        );
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_token_redirects_with_distinct_reason() {
        let (gate, identity) = build_gate(FakeIdentity::default().with_user("abc", user("u1")));
        let called = AtomicUsize::new(0);

        let response = gate
            .handle(request("/", Some("token=stale")), |_| async {
                called.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with(&format!(
            "reason={}",
            urlencoding::encode(DenyReason::InvalidCredentials.message())
        )));
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(called.load(Ordering::SeqCst), 0);
        assert_eq!(identity.whoami_calls(), 1);
    }

    #[tokio::test]
    async fn unreachable_identity_service_redirects_as_invalid_session() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let identity = HttpIdentityService::new(format!("http://{addr}"), Duration::from_secs(2))
            .unwrap();
        let gate = SessionGate::new(Arc::new(identity), GateConfig::new(""));
        let called = AtomicUsize::new(0);

        let response = gate
            .handle(request("/problems", Some("token=abc")), |_| async {
                called.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with(&format!(
            "reason={}",
            urlencoding::encode(DenyReason::InvalidCredentials.message())
        )));
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_identity_body_redirects_as_invalid_session() {
        use axum::{Json, Router, routing::get};

        let app = Router::new().route(
            "/users/me",
            get(|| async { Json(serde_json::json!({"name": "missing id"})) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let identity = HttpIdentityService::new(format!("http://{addr}"), Duration::from_secs(2))
            .unwrap();
        let gate = SessionGate::new(Arc::new(identity), GateConfig::new(""));
        let called = AtomicUsize::new(0);

        let response = gate
            .handle(request("/", Some("token=abc")), |_| async {
                called.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with(&format!(
            "reason={}",
            urlencoding::encode(DenyReason::InvalidCredentials.message())
        )));
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_user() {
        let (gate, _) = build_gate(FakeIdentity::default().with_user("abc", user("u1")));

        let response = gate
            .handle(request("/", Some("theme=dark; token=abc")), |req| async move {
                let ctx = req.extensions().get::<RequestContext>().cloned().unwrap();
                assert_eq!(ctx.token, "abc");
                assert_eq!(ctx.user.map(|u| u.id).as_deref(), Some("u1"));
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn cleared_token_is_persisted_as_empty_cookie() {
        let (gate, _) = build_gate(FakeIdentity::default().with_user("abc", user("u1")));

        let response = gate
            .handle(request("/", Some("token=abc")), |_| async {
                (SessionUpdate::Clear, StatusCode::OK).into_response()
            })
            .await;

        assert_eq!(
            response.headers()[header::SET_COOKIE],
            HeaderValue::from_static(
                "token=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=604800"
            )
        );
        assert!(response.extensions().get::<SessionUpdate>().is_none());
    }

    #[tokio::test]
    async fn setting_the_same_token_adds_no_cookie() {
        let (gate, _) = build_gate(FakeIdentity::default().with_user("abc", user("u1")));

        let response = gate
            .handle(request("/", Some("token=abc")), |_| async {
                (SessionUpdate::Set("abc".into()), StatusCode::OK).into_response()
            })
            .await;

        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn auth_subtree_is_delegated_without_credentials() {
        let (gate, _) = build_gate(FakeIdentity::default());

        let response = gate
            .handle(request("/auth/login?next=%2F", None), |req| async move {
                let ctx = req.extensions().get::<RequestContext>().cloned().unwrap();
                assert!(ctx.user.is_none());
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn stale_token_on_auth_page_is_cleared() {
        let (gate, _) = build_gate(FakeIdentity::default());

        let response = gate
            .handle(request("/auth/login", Some("token=stale")), |req| async move {
                let ctx = req.extensions().get::<RequestContext>().cloned().unwrap();
                assert_eq!(ctx.token, "");
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(
            response.headers()[header::SET_COOKIE].to_str().unwrap(),
            "token=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=604800"
        );
    }

    #[tokio::test]
    async fn login_on_auth_page_sets_new_token() {
        let (gate, _) = build_gate(FakeIdentity::default());

        let response = gate
            .handle(request("/auth/login", None), |_| async {
                (SessionUpdate::Set("fresh".into()), StatusCode::SEE_OTHER).into_response()
            })
            .await;

        assert_eq!(
            response.headers()[header::SET_COOKIE].to_str().unwrap(),
            "token=fresh; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=604800"
        );
    }
}
