//! Cookie codec for the session token.
//!
//! - Parsing is total: malformed input never fails, bad pairs are dropped.
//! - Encoding always emits the same attribute set so that a cleared token
//!   overwrites the cookie the browser already holds.

use std::collections::HashMap;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, header};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE_NAME: &str = "token";

/// Parse a `Cookie` header value into key/value pairs.
///
/// The first `=` splits key from value, so values may contain `=`.
/// Pairs without `=` or with an empty key are dropped. Later keys win.
pub fn parse_cookies(cookie: &str) -> HashMap<String, String> {
    cookie
        .split(';')
        .filter_map(|pair| {
            let (key, value) = pair.trim_start().split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Read the session token from every `Cookie` header of a request.
///
/// Absent header, absent key and non-UTF-8 headers all yield `""`.
pub fn token_from_headers(headers: &HeaderMap) -> String {
    // HTTP/2 clients may split cookies over several headers
    let joined = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    parse_cookies(&joined)
        .remove(TOKEN_COOKIE_NAME)
        .unwrap_or_default()
}

/// Build the `Set-Cookie` value persisting `token`.
///
/// Returns `None` if the token cannot be carried in a header value.
pub fn session_cookie(token: &str, max_age: Duration) -> Option<HeaderValue> {
    if token.contains(';') {
        return None;
    }

    let value = format!(
        "{TOKEN_COOKIE_NAME}={token}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        max_age.as_secs()
    );
    HeaderValue::from_str(&value).ok()
}
