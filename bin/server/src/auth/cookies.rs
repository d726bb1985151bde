//! Cookie names and attributes for the login flow.
//!
//! Every cookie is `Path=/`, `HttpOnly`, `SameSite=Lax` and, unless
//! disabled for local development, `Secure`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use time::{Duration as TimeDuration, OffsetDateTime};

/// Escaped anti-forgery state for the pending authorization.
pub const STATE_COOKIE: &str = "tunegate_authstate";

/// Escaped URL to return to once the handshake completes.
pub const GOTO_COOKIE: &str = "tunegate_goto";

/// Encoded credential of the authenticated session.
pub const CREDENTIAL_COOKIE: &str = "tunegate_token";

/// Lifetime of the state and goto cookies.
const HANDSHAKE_LIFETIME: TimeDuration = TimeDuration::hours(1);

/// Expiry for a state/goto pair set now.
pub fn handshake_expiry() -> OffsetDateTime {
    OffsetDateTime::now_utc() + HANDSHAKE_LIFETIME
}

/// Converts a credential expiry into a cookie expiry.
///
/// `None` (or an unrepresentable instant) yields a browser-session cookie.
pub fn credential_expiry(expiry: Option<DateTime<Utc>>) -> Option<OffsetDateTime> {
    expiry.and_then(|e| OffsetDateTime::from_unix_timestamp(e.timestamp()).ok())
}

/// Builds a flow cookie with the shared attributes.
pub fn build(
    name: &'static str,
    value: String,
    expires: Option<OffsetDateTime>,
    secure: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value))
        .path("/")
        .secure(secure)
        .http_only(true)
        .same_site(SameSite::Lax);
    if let Some(expires) = expires {
        cookie = cookie.expires(expires);
    }
    cookie.build()
}

/// Builds a cookie that clears `name` in the browser.
pub fn removal(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .secure(secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Reads a cookie and schedules its removal in one step.
///
/// The returned jar already clears the cookie, so any response built from
/// it consumes the value whether or not the caller succeeds. Empty values
/// read as absent.
pub fn take(jar: CookieJar, name: &'static str, secure: bool) -> (CookieJar, Option<String>) {
    let value = jar
        .get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    (jar.add(removal(name, secure)), value)
}
