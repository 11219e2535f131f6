//! Session cookie handling.
//!
//! Three cookies travel together: the signed session token, the last-activity
//! timestamp, and the configured idle timeout. The companions let a stateless
//! fronting layer judge staleness without consulting the registry.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};

/// Session token cookie.
pub const SESSION_COOKIE: &str = "palisade_session";

/// Last-activity timestamp cookie (unix seconds).
pub const LAST_ACTIVITY_COOKIE: &str = "palisade_last_activity";

/// Idle timeout cookie (minutes).
pub const TIMEOUT_COOKIE: &str = "palisade_timeout";

fn base_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build()
}

/// Add the session cookie set for a fresh login.
pub fn set_session_cookies(
    jar: CookieJar,
    token: &str,
    issued_at: DateTime<Utc>,
    timeout_minutes: u64,
    secure: bool,
) -> CookieJar {
    jar.add(base_cookie(SESSION_COOKIE, token.to_string(), secure))
        .add(base_cookie(
            LAST_ACTIVITY_COOKIE,
            issued_at.timestamp().to_string(),
            secure,
        ))
        .add(base_cookie(
            TIMEOUT_COOKIE,
            timeout_minutes.to_string(),
            secure,
        ))
}

/// Remove every session cookie.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    let mut jar = jar;
    for name in [SESSION_COOKIE, LAST_ACTIVITY_COOKIE, TIMEOUT_COOKIE] {
        let mut cookie = Cookie::from(name);
        cookie.set_path("/");
        jar = jar.remove(cookie);
    }
    jar
}

/// Read the session token from the jar.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}
