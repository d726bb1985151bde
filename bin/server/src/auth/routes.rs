//! Authentication routes for the provider callback and the login entry point.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tunegate_provider::{CallbackParams, ProviderError};
use tunegate_session::{encode_credential, unescape};

use super::{AppState, AuthAdaptor, cookies};
use crate::error::{JsonError, internal_server_error};

/// Message returned when the login entry point is called without a target.
const MISSING_URL_MESSAGE: &str = "url is a required paramter";

/// Decoded query string as ordered key/value pairs.
///
/// Repeated keys are kept, so extraction only fails on a query that cannot
/// be decoded at all.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Query parameters for the login entry point.
#[derive(Debug, Default)]
pub struct LoginQuery {
    /// Where to send the browser after authentication.
    pub url: Option<String>,
}

impl LoginQuery {
    /// Collects the parameters from decoded query pairs; the first `url` wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            url: pairs
                .into_iter()
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value),
        }
    }
}

/// Handles the provider's redirect back after the user authorized us.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    query: QueryPairs,
) -> Response {
    let params = query.map(|Query(pairs)| CallbackParams::from_pairs(pairs));
    state.auth.handle_callback(jar, params).await
}

/// Starts the login flow for the URL given in the `url` query parameter.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    query: QueryPairs,
) -> Response {
    let query = match query {
        Ok(Query(pairs)) => LoginQuery::from_pairs(pairs),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read login query");
            LoginQuery::default()
        }
    };
    state.auth.begin_from_query(jar, query)
}

impl AuthAdaptor {
    /// Completes the handshake: consumes the state, exchanges the code and
    /// stores the credential.
    ///
    /// The state cookie is cleared on every path out of this function,
    /// including an undecodable query. Any failure is logged and answered
    /// with a generic 500; the user has to start over.
    pub async fn handle_callback(
        &self,
        jar: CookieJar,
        params: Result<CallbackParams, QueryRejection>,
    ) -> Response {
        let (jar, raw_state) = cookies::take(jar, cookies::STATE_COOKIE, self.secure_cookies);

        let params = match params {
            Ok(params) => params,
            Err(e) => {
                tracing::error!(error = %e, "failed to read callback query");
                return (jar, internal_server_error()).into_response();
            }
        };

        let Some(raw_state) = raw_state else {
            tracing::error!(cookie = cookies::STATE_COOKIE, "missing required cookie");
            return (jar, internal_server_error()).into_response();
        };

        let state = match unescape(&raw_state) {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "failed to unescape state");
                return (jar, internal_server_error()).into_response();
            }
        };

        let exchange = self.provider.exchange(&state, &params);
        let credential = match tokio::time::timeout(self.exchange_timeout, exchange).await {
            Ok(Ok(credential)) => credential,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "failed to get token");
                return (jar, internal_server_error()).into_response();
            }
            Err(_) => {
                tracing::error!(
                    error = %ProviderError::Timeout,
                    timeout_secs = self.exchange_timeout.as_secs(),
                    "failed to get token"
                );
                return (jar, internal_server_error()).into_response();
            }
        };

        let value = match encode_credential(&credential) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "failed to marshal token");
                return (jar, internal_server_error()).into_response();
            }
        };

        let jar = jar.add(cookies::build(
            cookies::CREDENTIAL_COOKIE,
            value,
            cookies::credential_expiry(credential.expiry),
            self.secure_cookies,
        ));

        let goto = jar
            .get(cookies::GOTO_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());
        let Some(raw_goto) = goto else {
            return (jar, "OK").into_response();
        };

        let jar = jar.add(cookies::removal(cookies::GOTO_COOKIE, self.secure_cookies));
        let target = match unescape(&raw_goto) {
            Ok(target) => target,
            Err(e) => {
                tracing::error!(error = %e, "failed to unescape goto target");
                return (jar, internal_server_error()).into_response();
            }
        };
        if let Err(e) = HeaderValue::try_from(target.as_str()) {
            tracing::error!(error = %e, "goto target is not a valid location");
            return (jar, internal_server_error()).into_response();
        }

        tracing::debug!(goto = %target, "authenticated, returning to original destination");
        (jar, Redirect::temporary(&target)).into_response()
    }

    /// Starts the login flow towards the `url` query parameter.
    ///
    /// Answers 400 when the parameter is missing.
    pub fn begin_from_query(&self, jar: CookieJar, query: LoginQuery) -> Response {
        match query.url.filter(|u| !u.is_empty()) {
            Some(url) => self.begin_authorization(jar, &url),
            None => {
                tracing::warn!("No url provided, cannot redirect client");
                JsonError::new(StatusCode::BAD_REQUEST, MISSING_URL_MESSAGE).into_response()
            }
        }
    }
}
