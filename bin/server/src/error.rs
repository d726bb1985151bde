//! Domain error types for server operations.
//!
//! Client-visible failures carry a JSON body `{ "error": <message> }`.
//! Protocol faults are logged where they happen and answered with a generic
//! 500 that leaks no detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// A structured JSON error response.
#[derive(Debug)]
pub struct JsonError {
    status: StatusCode,
    message: String,
}

impl JsonError {
    /// Creates an error response with the given status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// The generic 500 used for protocol faults.
pub fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// Errors obtaining a provider API client for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No credential was attached to the request.
    NotAuthenticated,
    /// A credential was present but no client could be built from it.
    Construction { details: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "no authentication found"),
            Self::Construction { details } => {
                write!(f, "failed to build provider client: {}", details)
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl IntoResponse for ClientError {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => JsonError::new(
                StatusCode::UNAUTHORIZED,
                format!("user not signed in: {}", self),
            )
            .into_response(),
            Self::Construction { details } => {
                tracing::error!(error = %details, "getting provider client");
                internal_server_error()
            }
        }
    }
}

/// Errors assembling the auth adaptor at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// A configured URL could not be parsed.
    InvalidUrl { field: &'static str, reason: String },
    /// A configured route would collide with another route.
    RouteConflict { path: String, reason: &'static str },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { field, reason } => {
                write!(f, "invalid URL for '{}': {}", field, reason)
            }
            Self::RouteConflict { path, reason } => {
                write!(f, "route '{}' {}", path, reason)
            }
        }
    }
}

impl std::error::Error for SetupError {}
