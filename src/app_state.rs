//! Implements a struct that holds the state of the web server.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    auth::{DEFAULT_COOKIE_DURATION, PasswordHash},
    export::ExportClient,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The hash of the password that unlocks the app.
    pub password_hash: PasswordHash,

    /// The client for downloading transaction exports from Engaging Networks.
    pub export_client: ExportClient,
}

impl AppState {
    /// Create a new [AppState] with the default session duration.
    ///
    /// `cookie_secret` is hashed to create the key for the session cookie.
    pub fn new(cookie_secret: &str, password_hash: PasswordHash, export_client: ExportClient) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            password_hash,
            export_client,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod app_state_tests {
    use crate::app_state::create_cookie_key;

    #[test]
    fn same_secret_gives_same_key() {
        assert_eq!(
            create_cookie_key("correct horse").master(),
            create_cookie_key("correct horse").master()
        );
        assert_ne!(
            create_cookie_key("correct horse").master(),
            create_cookie_key("battery staple").master()
        );
    }
}
