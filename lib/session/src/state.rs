//! Single-use anti-forgery state tokens for the authorization handshake.

use oauth2::CsrfToken;
use std::fmt;

/// An unguessable token binding an authorization request to its callback.
///
/// A fresh token is generated for every redirect to the provider. The
/// server keeps no copy; the browser carries it in the state cookie and the
/// provider echoes it back in the callback query.
#[derive(Clone, PartialEq, Eq)]
pub struct StateToken(String);

impl StateToken {
    /// Generates a new random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(CsrfToken::new_random().secret().clone())
    }

    /// Wraps a token read back from a cookie.
    #[must_use]
    pub fn from_secret(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the token value.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Returns the token as an oauth2 CSRF token.
    #[must_use]
    pub fn as_csrf_token(&self) -> CsrfToken {
        CsrfToken::new(self.0.clone())
    }
}

// Redacted so tokens never end up in logs.
impl fmt::Debug for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateToken([redacted])")
    }
}
