//! Cookie value encoding.
//!
//! Credentials are stored as `base64(json(credential))` using the standard
//! base64 alphabet. Free-form values (state tokens, goto URLs) are
//! percent-escaped so they survive as cookie values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tunegate_core::{Credential, Result};

use crate::error::CodecError;

/// Serializes a credential into a cookie value.
pub fn encode_credential(credential: &Credential) -> Result<String, CodecError> {
    let json = serde_json::to_vec(credential).map_err(|e| CodecError::Serialization {
        reason: e.to_string(),
    })?;
    Ok(STANDARD.encode(json))
}

/// Parses a cookie value produced by [`encode_credential`].
pub fn decode_credential(value: &str) -> Result<Credential, CodecError> {
    let bytes = STANDARD
        .decode(value)
        .map_err(|e| CodecError::InvalidBase64 {
            reason: e.to_string(),
        })?;
    let credential = serde_json::from_slice(&bytes).map_err(|e| CodecError::InvalidJson {
        reason: e.to_string(),
    })?;
    Ok(credential)
}

/// Percent-escapes a value for storage in a cookie.
///
/// Everything except ASCII alphanumerics and `-_.~` is escaped, so the
/// result never contains cookie delimiters.
#[must_use]
pub fn escape(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Reverses [`escape`].
///
/// Accepts query-style input as well: `+` decodes to a space.
pub fn unescape(value: &str) -> Result<String, CodecError> {
    check_escapes(value)?;
    let spaced = value.replace('+', " ");
    let decoded = urlencoding::decode(&spaced).map_err(|e| CodecError::InvalidEscape {
        reason: e.to_string(),
    })?;
    Ok(decoded.into_owned())
}

/// Rejects `%` that is not followed by two hex digits.
fn check_escapes(value: &str) -> std::result::Result<(), CodecError> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !well_formed {
                let end = (i + 3).min(bytes.len());
                return Err(CodecError::InvalidEscape {
                    reason: format!("malformed escape {:?}", String::from_utf8_lossy(&bytes[i..end])),
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn full_credential() -> Credential {
        Credential::bearer(
            "BQDa-access",
            Some(Utc.with_ymd_and_hms(2031, 5, 6, 7, 8, 9).single().expect("valid date")),
        )
        .with_refresh_token(Some("AQC-refresh".to_string()))
    }

    #[test]
    fn credential_survives_encode_decode() {
        let credential = full_credential();
        let encoded = encode_credential(&credential).expect("encode");
        let decoded = decode_credential(&encoded).expect("decode");
        assert_eq!(decoded, credential);
    }

    #[test]
    fn encoded_credential_is_standard_base64_json() {
        let encoded = encode_credential(&full_credential()).expect("encode");
        let json = STANDARD.decode(&encoded).expect("standard base64");
        let value: serde_json::Value = serde_json::from_slice(&json).expect("json");
        assert_eq!(value["access_token"], "BQDa-access");
        assert_eq!(value["refresh_token"], "AQC-refresh");
    }

    #[test]
    fn decode_rejects_non_base64() {
        let err = decode_credential("not base64 at all!").expect_err("should fail");
        assert!(err.to_string().contains("invalid base64"));
    }

    #[test]
    fn decode_rejects_base64_that_is_not_a_credential() {
        let value = STANDARD.encode(b"{\"nope\": true");
        let err = decode_credential(&value).expect_err("should fail");
        assert!(err.to_string().contains("invalid credential json"));
    }

    #[test]
    fn escape_leaves_no_cookie_delimiters() {
        let escaped = escape("/playlists?ids=a;b, c&x=1");
        assert!(!escaped.contains(';'));
        assert!(!escaped.contains(','));
        assert!(!escaped.contains(' '));
        assert_eq!(
            unescape(&escaped).expect("unescape"),
            "/playlists?ids=a;b, c&x=1"
        );
    }

    #[test]
    fn unescape_reads_plus_as_space() {
        assert_eq!(unescape("top+tracks%2B").expect("unescape"), "top tracks+");
    }

    #[test]
    fn unescape_rejects_truncated_escape() {
        assert!(unescape("%2").is_err());
        assert!(unescape("abc%").is_err());
    }

    #[test]
    fn unescape_rejects_non_hex_escape() {
        assert!(unescape("%zz").is_err());
    }

    #[test]
    fn unescape_rejects_invalid_utf8() {
        assert!(unescape("%ff%fe").is_err());
    }
}
