//! The credential bundle granted by the remote provider.
//!
//! A `Credential` is produced by a successful authorization code exchange and
//! travels with the browser in a cookie. It is never mutated after it has been
//! issued; a fresh exchange replaces it wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access token, optional refresh token, token type and expiry.
///
/// The JSON shape (`access_token`, `token_type`, `refresh_token`, `expiry`)
/// is the cookie wire format and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token used against the provider API.
    pub access_token: String,
    /// Token type reported by the provider, usually `Bearer`.
    #[serde(default)]
    pub token_type: String,
    /// Refresh token, when the provider issued one. Never used for refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Instant after which the access token is no longer accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// Creates a bearer credential expiring at `expiry`.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>, expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            expiry,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token;
        self
    }

    /// Returns true if the credential can be used right now.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Returns true if the credential carries a token and has not expired at `now`.
    ///
    /// A credential without an expiry never expires on its own.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        self.expiry.is_none_or(|expiry| now < expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn unexpired_credential_is_valid() {
        let now = Utc::now();
        let credential = Credential::bearer("token", Some(now + Duration::minutes(5)));
        assert!(credential.is_valid_at(now));
    }

    #[test]
    fn credential_is_invalid_at_its_expiry() {
        let now = Utc::now();
        let credential = Credential::bearer("token", Some(now));
        assert!(!credential.is_valid_at(now));
        assert!(!credential.is_valid_at(now + Duration::seconds(1)));
    }

    #[test]
    fn empty_access_token_is_invalid() {
        let credential = Credential::bearer("", None);
        assert!(!credential.is_valid());
    }

    #[test]
    fn credential_without_expiry_is_valid() {
        let credential = Credential::bearer("token", None);
        assert!(credential.is_valid());
    }

    #[test]
    fn json_omits_absent_optional_fields() {
        let credential = Credential::bearer("token", None);
        let json = serde_json::to_value(&credential).expect("serialize");

        assert_eq!(json["access_token"], "token");
        assert_eq!(json["token_type"], "Bearer");
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("expiry").is_none());
    }

    #[test]
    fn deserializes_provider_style_json() {
        let json = r#"{
            "access_token": "BQD",
            "token_type": "Bearer",
            "refresh_token": "AQC",
            "expiry": "2030-01-02T03:04:05Z"
        }"#;

        let credential: Credential = serde_json::from_str(json).expect("deserialize");

        assert_eq!(credential.access_token, "BQD");
        assert_eq!(credential.refresh_token.as_deref(), Some("AQC"));
        assert_eq!(
            credential.expiry.map(|e| e.to_rfc3339()),
            Some("2030-01-02T03:04:05+00:00".to_string())
        );
    }
}
