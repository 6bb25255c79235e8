//! Defines functions for handling authentication with an encrypted session cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::Session};

pub(crate) const COOKIE_SESSION: &str = "session";

/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Add a session cookie to the cookie jar, indicating that the user is logged in.
///
/// The cookie expires at the same time as `session`.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the session could not be serialized.
pub fn set_session_cookie(jar: PrivateCookieJar, session: &Session) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(session)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, value))
            .expires(session.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the session from the session cookie, whether or not it has expired.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no session cookie in `jar`.
/// - [Error::JSONSerializationError] if the cookie does not hold a session.
pub fn get_session_from_cookies(jar: &PrivateCookieJar) -> Result<Session, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::CookieMissing)?;

    serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::JSONSerializationError(error.to_string()))
}

/// Push the session in `jar` back so that it expires no sooner than `duration` from now.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned. See
/// [get_session_from_cookies] and [set_session_cookie] for the possible errors.
pub fn extend_session_cookie(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let session = get_session_from_cookies(&jar)?.extended(OffsetDateTime::now_utc(), duration);

    set_session_cookie(jar, &session)
}
