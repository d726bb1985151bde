//! Protected API routes backed by the provider.
//!
//! Handlers receive a per-request [`Service`] through the [`RequireService`]
//! extractor, which only succeeds behind [`require_session`](crate::auth::require_session).

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use rootcause::prelude::Report;
use std::sync::Arc;
use tunegate_provider::{ApiClient, ApiError, UserProfile};

use crate::auth::AppState;
use crate::error::ClientError;

/// Prefix of every route served behind the session middleware.
pub const API_PREFIX: &str = "/v1";

/// Route of the [`whoami`] handler.
pub const WHOAMI_PATH: &str = "/v1/whoami";

/// Business operations available to an authenticated user.
///
/// Lives for a single request and owns that request's provider client.
#[derive(Debug)]
pub struct Service {
    client: ApiClient,
}

impl Service {
    /// Wraps a provider client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Looks up the profile of the signed-in user.
    pub async fn whoami(&self) -> Result<UserProfile, Report<ApiError>> {
        self.client.current_user().await
    }
}

/// Extractor for requiring a provider-backed service.
///
/// Rejects with 401 when the request carries no session credential.
pub struct RequireService(pub Service);

impl<S> FromRequestParts<S> for RequireService
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ClientError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let client = app_state.auth.extract_client(&parts.extensions)?;
        Ok(RequireService(Service::new(client)))
    }
}

/// Returns the signed-in user's provider profile.
pub async fn whoami(RequireService(service): RequireService) -> Response {
    match service.whoami().await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "looking up current user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {e}"),
            )
                .into_response()
        }
    }
}
