//! Authentication module for the tunegate server.
//!
//! This module provides:
//! - The auth adaptor driving the OAuth2 authorization code flow
//! - Cookie-only session handling (no server-side session table)
//! - Session middleware gating protected routes
//!
//! # Session lifecycle
//!
//! A browser moves through anonymous → pending authorization → authenticated
//! → expired. Redirecting to the provider sets the state and goto cookies;
//! the callback consumes both and sets the credential cookie; once the
//! credential expires the middleware sends the browser through the flow
//! again. There is no refresh path.
//!
//! Two tabs finishing the handshake at once both set the credential cookie
//! and the browser keeps whichever arrives last.

pub mod cookies;
pub mod middleware;
pub mod routes;

use axum::{
    http::{Extensions, Uri},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use rootcause::prelude::Report;
use std::sync::Arc;
use std::time::Duration;
use tunegate_core::Credential;
use tunegate_provider::{ApiClient, AuthProvider};
use tunegate_session::{StateToken, decode_credential, escape};

use crate::api::API_PREFIX;
use crate::config::AuthConfig;
use crate::error::{ClientError, SetupError};

pub use cookies::{CREDENTIAL_COOKIE, GOTO_COOKIE, STATE_COOKIE};
pub use middleware::{SessionCredential, require_session};
pub use routes::{LoginQuery, callback, login};

/// Shared application state.
pub struct AppState {
    /// Auth adaptor for the login flow and protected routes.
    pub auth: AuthAdaptor,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(auth: AuthAdaptor) -> Self {
        Self { auth }
    }
}

/// Drives the login flow against the remote provider.
///
/// Holds only configuration, read-only after construction; all session
/// state lives in the browser's cookies.
pub struct AuthAdaptor {
    provider: Arc<dyn AuthProvider>,
    callback_path: String,
    ui_redirect_path: String,
    exchange_timeout: Duration,
    secure_cookies: bool,
}

impl AuthAdaptor {
    /// Creates an adaptor from the provider and login configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback or UI redirect URL is not an
    /// absolute URL, or if their paths collide with each other or with the
    /// API routes.
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        config: &AuthConfig,
    ) -> Result<Self, Report<SetupError>> {
        let callback_path = absolute_url_path("callback_url", &config.callback_url)?;
        let ui_redirect_path = absolute_url_path("ui_redirect_url", &config.ui_redirect_url)?;

        if callback_path == ui_redirect_path {
            return Err(SetupError::RouteConflict {
                path: callback_path,
                reason: "is used by both the callback and the login entry point",
            }
            .into());
        }
        for path in [&callback_path, &ui_redirect_path] {
            if is_api_path(path) {
                return Err(SetupError::RouteConflict {
                    path: path.clone(),
                    reason: "is reserved for the API",
                }
                .into());
            }
        }

        Ok(Self {
            provider,
            callback_path,
            ui_redirect_path,
            exchange_timeout: config.exchange_timeout(),
            secure_cookies: config.secure_cookies,
        })
    }

    /// Path of the route the provider redirects back to.
    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// Path of the application's login entry point.
    #[must_use]
    pub fn ui_redirect_path(&self) -> &str {
        &self.ui_redirect_path
    }

    /// Sends the browser to the provider, remembering where it came from.
    ///
    /// Sets the state and goto cookies and answers with a 307 to the
    /// authorization endpoint carrying the same state. This is the only way
    /// a session enters pending authorization.
    pub fn begin_authorization(&self, jar: CookieJar, current_url: &str) -> Response {
        let state = StateToken::generate();
        let expires = cookies::handshake_expiry();

        let jar = jar
            .add(cookies::build(
                STATE_COOKIE,
                escape(state.secret()),
                Some(expires),
                self.secure_cookies,
            ))
            .add(cookies::build(
                GOTO_COOKIE,
                escape(current_url),
                Some(expires),
                self.secure_cookies,
            ));

        let auth_url = self.provider.authorization_url(&state);
        tracing::debug!(goto = %current_url, "redirecting to provider for authorization");

        (jar, Redirect::temporary(&auth_url)).into_response()
    }

    /// Returns the credential from the request's cookies if it is usable.
    ///
    /// Missing, undecodable and expired credentials all yield `None`.
    pub fn session_credential(&self, jar: &CookieJar) -> Option<Credential> {
        let value = jar
            .get(CREDENTIAL_COOKIE)
            .map(|c| c.value())
            .filter(|v| !v.is_empty())?;

        let credential = match decode_credential(value) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode credential cookie");
                return None;
            }
        };

        if !credential.is_valid() {
            tracing::debug!("credential cookie has expired");
            return None;
        }

        Some(credential)
    }

    /// Builds a provider API client from the credential attached to the request.
    ///
    /// The returned client retries rate-limited calls.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` if the session middleware did
    /// not attach a credential.
    pub fn extract_client(&self, extensions: &Extensions) -> Result<ApiClient, ClientError> {
        let SessionCredential(credential) = extensions
            .get::<SessionCredential>()
            .ok_or(ClientError::NotAuthenticated)?;

        let mut client =
            self.provider
                .new_client(credential)
                .map_err(|e| ClientError::Construction {
                    details: e.to_string(),
                })?;
        client.set_auto_retry(true);

        Ok(client)
    }
}

fn is_api_path(path: &str) -> bool {
    path.strip_prefix(API_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn absolute_url_path(field: &'static str, url: &str) -> Result<String, SetupError> {
    let uri: Uri = url.parse().map_err(|e: axum::http::uri::InvalidUri| {
        SetupError::InvalidUrl {
            field,
            reason: e.to_string(),
        }
    })?;

    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(SetupError::InvalidUrl {
            field,
            reason: "expected an absolute URL".to_string(),
        });
    }

    Ok(uri.path().to_string())
}
