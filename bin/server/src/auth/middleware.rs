//! Session middleware for Axum.

use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tunegate_core::Credential;

use super::AppState;

/// Credential of the authenticated session, attached to the request by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct SessionCredential(pub Credential);

/// Gates a route on a usable credential cookie.
///
/// Requests without one are sent through the login flow with the current
/// URL as the goto target and never reach the inner handler.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match state.auth.session_credential(&jar) {
        Some(credential) => {
            req.extensions_mut().insert(SessionCredential(credential));
            next.run(req).await
        }
        None => {
            let current_url = current_url(&req);
            tracing::debug!(url = %current_url, "no usable session, starting login");
            state.auth.begin_authorization(jar, &current_url)
        }
    }
}

/// Path and query of the request as the browser sent it.
fn current_url(req: &Request) -> String {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri)
        .unwrap_or_else(|| req.uri());
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}
