//! Error types for the provider crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ProviderError`: Authorization handshake and client construction failures
//! - `ApiError`: Failures calling the provider API with a credential

use std::fmt;

/// Errors from the authorization code flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Invalid endpoint URL or HTTP client setup.
    Configuration { reason: String },
    /// The provider reported an error instead of an authorization code.
    Denied { reason: String },
    /// Callback state does not match the state sent with the authorization request.
    StateMismatch,
    /// Callback carried no authorization code.
    MissingCode,
    /// The token endpoint rejected the exchange or could not be reached.
    TokenExchange { reason: String },
    /// The token exchange did not finish in time.
    Timeout,
    /// The credential cannot be used to build an API client.
    InvalidCredential { reason: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => write!(f, "provider configuration error: {reason}"),
            Self::Denied { reason } => write!(f, "authorization denied by provider: {reason}"),
            Self::StateMismatch => write!(f, "callback state does not match"),
            Self::MissingCode => write!(f, "callback is missing the authorization code"),
            Self::TokenExchange { reason } => write!(f, "token exchange failed: {reason}"),
            Self::Timeout => write!(f, "token exchange timed out"),
            Self::InvalidCredential { reason } => write!(f, "invalid credential: {reason}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Errors from provider API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be sent or the response not read.
    RequestFailed { reason: String },
    /// Rate limited and not retried.
    RateLimited { retry_after_secs: Option<u64> },
    /// Non-success status from the API.
    Status { status: u16, body: String },
    /// The response body did not have the expected shape.
    InvalidResponse { reason: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => write!(f, "request failed: {reason}"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::Status { status, body } => write!(f, "provider returned {status}: {body}"),
            Self::InvalidResponse { reason } => write!(f, "invalid response: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_display_includes_reason() {
        let err = ProviderError::Denied {
            reason: "access_denied".to_string(),
        };
        assert!(err.to_string().contains("denied"));
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn rate_limited_display() {
        let err = ApiError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert!(err.to_string().contains("30s"));
        assert_eq!(
            ApiError::RateLimited {
                retry_after_secs: None
            }
            .to_string(),
            "rate limited"
        );
    }

    #[test]
    fn status_display() {
        let err = ApiError::Status {
            status: 401,
            body: "The access token expired".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("expired"));
    }
}
