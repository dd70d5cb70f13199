//! Double-submit CSRF guard.
//!
//! `GET /api/csrf-token` hands the client a random secret both in the body
//! and in the `_csrf` cookie. Every state-changing request must echo the
//! secret in `x-csrf-token`.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use edemy_core::AppError;
use http::Method;
use rand::RngExt;

use crate::cookie::CSRF_COOKIE;

pub const CSRF_HEADER: &str = "x-csrf-token";

const TOKEN_LEN: usize = 32;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Fresh random CSRF secret.
pub fn generate_csrf_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware: reject non-safe requests whose `x-csrf-token` header does not
/// match the `_csrf` cookie. Apply with `axum::middleware::from_fn(require_csrf)`.
pub async fn require_csrf(req: Request, next: Next) -> Result<Response, AppError> {
    if is_safe(req.method()) {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let jar = CookieJar::from_headers(req.headers());
    let cookie = jar.get(CSRF_COOKIE).map(|c| c.value().to_owned());

    match (header, cookie) {
        (Some(h), Some(c)) if !c.is_empty() && constant_time_eq(h.as_bytes(), c.as_bytes()) => {
            Ok(next.run(req).await)
        }
        _ => {
            tracing::debug!(method = %req.method(), uri = %req.uri(), "csrf check failed");
            Err(AppError::Forbidden)
        }
    }
}
