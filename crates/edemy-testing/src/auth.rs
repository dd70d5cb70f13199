//! Signed-in test callers.
//!
//! `MockAuth` mints a real session token with the test secret and pairs it
//! with a CSRF secret, so requests pass the same extractor and middleware
//! they would in production.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use edemy_auth_types::cookie::{CSRF_COOKIE, SESSION_COOKIE};
use edemy_auth_types::csrf::{CSRF_HEADER, generate_csrf_token};
use edemy_auth_types::token::issue_session_token;
use edemy_domain::id::UserId;

/// Secret used by test `AppState`s to sign session tokens.
pub const TEST_JWT_SECRET: &str = "edemy-test-secret";

pub struct MockAuth {
    pub user_id: UserId,
    pub token: String,
    pub csrf: String,
}

impl MockAuth {
    /// Panics if the token cannot be signed.
    pub fn new(user_id: UserId) -> Self {
        let token = issue_session_token(user_id, TEST_JWT_SECRET).expect("sign test token");
        Self {
            user_id,
            token,
            csrf: generate_csrf_token(),
        }
    }

    /// `Cookie` header value carrying both the session and CSRF cookies.
    pub fn cookie(&self) -> String {
        format!(
            "{SESSION_COOKIE}={}; {CSRF_COOKIE}={}",
            self.token, self.csrf
        )
    }

    /// Headers for a state-changing request: cookies plus `x-csrf-token`.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::COOKIE,
            HeaderValue::from_str(&self.cookie()).expect("cookie header"),
        );
        map.insert(
            HeaderName::from_static(CSRF_HEADER),
            HeaderValue::from_str(&self.csrf).expect("csrf header"),
        );
        map
    }
}

/// Headers for an anonymous state-changing request (CSRF only).
pub fn anonymous_csrf_headers() -> HeaderMap {
    let csrf = generate_csrf_token();
    let mut map = HeaderMap::new();
    map.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("{CSRF_COOKIE}={csrf}")).expect("cookie header"),
    );
    map.insert(
        HeaderName::from_static(CSRF_HEADER),
        HeaderValue::from_str(&csrf).expect("csrf header"),
    );
    map
}
