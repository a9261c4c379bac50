//! Session cookie helpers for Axum.

use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::types::SessionRecord;

/// Cookie name scanners expect from a PHP-style login page.
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// Token carried by the request, if any
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Attach the session cookie for a freshly created record.
///
/// No `Secure`, no `SameSite`: the fixture is meant to be weak.
pub fn with_session(jar: CookieJar, record: &SessionRecord) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, record.session_id().to_string()))
        .path("/")
        .http_only(true)
        .build();
    jar.add(cookie)
}

/// Remove the session cookie.
pub fn without_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}
