//! Application router.

use axum::{
    Router, body::Body, extract::Request, middleware::from_fn_with_state, routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::api;
use crate::auth::{self, AppState};

/// Builds the router serving the login flow and the protected API.
///
/// The callback and login entry point are mounted at the paths of the
/// configured URLs; everything under `/v1` requires a session.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route(api::WHOAMI_PATH, get(api::whoami))
        .route_layer(from_fn_with_state(state.clone(), auth::require_session));

    Router::new()
        .route(state.auth.callback_path(), get(auth::callback))
        .route(state.auth.ui_redirect_path(), get(auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Span for one HTTP request.
///
/// Records the path only; the callback query carries the single-use
/// authorization code.
fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!("request", method = %req.method(), path = %req.uri().path())
}
