//! HTTP Basic access guard for the admin endpoints.

use std::fmt;

use headers::authorization::Basic;
use headers::{Authorization, Header};
use http::HeaderValue;
use subtle::ConstantTimeEq;

/// The single admin identity allowed to read the collection.
#[derive(Clone)]
pub struct AccessGuard {
    username: String,
    password: String,
}

impl AccessGuard {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// `true` iff `header` carries Basic credentials equal to the configured pair.
    ///
    /// A missing header, another scheme, bad base64, non-UTF-8 text or a
    /// missing `:` are all plain "no", never an error.
    pub fn authorize(&self, header: Option<&HeaderValue>) -> bool {
        let Some(value) = header else {
            return false;
        };
        let Ok(Authorization(credentials)) =
            Authorization::<Basic>::decode(&mut std::iter::once(value))
        else {
            return false;
        };

        let user = credentials.username().as_bytes().ct_eq(self.username.as_bytes());
        let pass = credentials.password().as_bytes().ct_eq(self.password.as_bytes());
        bool::from(user & pass)
    }
}

impl fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGuard")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
