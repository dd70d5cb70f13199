//! `Session` extractor: the authenticated caller, read from the session cookie.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::cookie::CookieJar;
use edemy_core::AppError;
use edemy_domain::id::UserId;
use http::request::Parts;

use crate::cookie::SESSION_COOKIE;
use crate::token::validate_session_token;

/// HMAC secret used to sign and verify session tokens.
///
/// Services expose it from their state via `FromRef`.
#[derive(Clone)]
pub struct SessionKey(pub Arc<str>);

impl SessionKey {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Authenticated caller. Rejects with 401 when the cookie is missing,
/// expired, or signed with another key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

impl<S> FromRequestParts<S> for Session
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    // Resolve synchronously; the returned future must not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let key = SessionKey::from_ref(state);
        let result = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .ok_or(AppError::Unauthorized)
            .and_then(|cookie| {
                validate_session_token(cookie.value(), key.as_str()).map_err(|e| {
                    tracing::debug!(error = %e, "session token rejected");
                    AppError::Unauthorized
                })
            })
            .map(|info| Session {
                user_id: info.user_id,
            });

        async move { result }
    }
}
