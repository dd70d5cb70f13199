//! Cookie builders for the session token and the CSRF secret.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::SESSION_TOKEN_EXP;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Cookie carrying the CSRF secret echoed back in `x-csrf-token`.
pub const CSRF_COOKIE: &str = "_csrf";

/// Deployment-specific cookie attributes.
#[derive(Debug, Clone, Default)]
pub struct CookieSettings {
    pub domain: Option<String>,
    pub secure: bool,
}

impl CookieSettings {
    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path("/")
            .max_age(max_age)
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }
}

/// Set the session cookie; lives as long as the token it carries.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use edemy_auth_types::cookie::{CookieSettings, SESSION_COOKIE, set_session_cookie};
///
/// let settings = CookieSettings { domain: None, secure: true };
/// let jar = set_session_cookie(CookieJar::new(), "jwt".to_string(), &settings);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "jwt");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, token: String, settings: &CookieSettings) -> CookieJar {
    jar.add(settings.build(
        SESSION_COOKIE,
        token,
        Duration::seconds(SESSION_TOKEN_EXP as i64),
    ))
}

/// Expire the session cookie.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use edemy_auth_types::cookie::{
///     CookieSettings, SESSION_COOKIE, clear_session_cookie, set_session_cookie,
/// };
///
/// let settings = CookieSettings::default();
/// let jar = set_session_cookie(CookieJar::new(), "jwt".to_string(), &settings);
/// let jar = clear_session_cookie(jar, &settings);
/// assert_eq!(jar.get(SESSION_COOKIE).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookie(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(settings.build(SESSION_COOKIE, String::new(), Duration::ZERO))
}

/// Set the CSRF secret cookie (session lifetime).
pub fn set_csrf_cookie(jar: CookieJar, secret: String, settings: &CookieSettings) -> CookieJar {
    jar.add(settings.build(
        CSRF_COOKIE,
        secret,
        Duration::seconds(SESSION_TOKEN_EXP as i64),
    ))
}
