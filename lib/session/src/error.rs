//! Error types for the session crate.

use std::fmt;

/// Errors from decoding cookie values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The cookie value is not valid base64.
    InvalidBase64 { reason: String },
    /// The decoded bytes are not a JSON credential.
    InvalidJson { reason: String },
    /// The credential could not be serialized.
    Serialization { reason: String },
    /// A percent escape is malformed or decodes to invalid UTF-8.
    InvalidEscape { reason: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBase64 { reason } => write!(f, "invalid base64 cookie value: {reason}"),
            Self::InvalidJson { reason } => write!(f, "invalid credential json: {reason}"),
            Self::Serialization { reason } => {
                write!(f, "failed to serialize credential: {reason}")
            }
            Self::InvalidEscape { reason } => write!(f, "invalid escape sequence: {reason}"),
        }
    }
}

impl std::error::Error for CodecError {}
