//! Authorization code flow against an OAuth2 provider using the oauth2 crate.

use async_trait::async_trait;
use chrono::Utc;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, Scope, TokenResponse,
    TokenUrl,
    basic::{BasicClient, BasicTokenResponse, BasicTokenType},
};
use rootcause::prelude::Report;
use tracing::{debug, instrument};
use tunegate_core::Credential;
use tunegate_session::StateToken;

use crate::client::ApiClient;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::{AuthProvider, CallbackParams};

/// OAuth2 provider using the authorization code grant with a client secret.
///
/// Endpoint URLs are validated once at construction; the oauth2 client is
/// assembled per call from the validated parts.
#[derive(Clone)]
pub struct OAuth2Provider {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    scopes: Vec<Scope>,
    api_base_url: String,
    http: reqwest::Client,
}

impl OAuth2Provider {
    /// Creates a provider that sends users back to `redirect_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ProviderConfig, redirect_url: &str) -> Result<Self, Report<ProviderError>> {
        let auth_url = AuthUrl::new(config.auth_url().to_string()).map_err(|e| {
            ProviderError::Configuration {
                reason: format!("invalid auth URL: {e}"),
            }
        })?;
        let token_url = TokenUrl::new(config.token_url().to_string()).map_err(|e| {
            ProviderError::Configuration {
                reason: format!("invalid token URL: {e}"),
            }
        })?;
        let redirect_url = RedirectUrl::new(redirect_url.to_string()).map_err(|e| {
            ProviderError::Configuration {
                reason: format!("invalid redirect URL: {e}"),
            }
        })?;

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ProviderError::Configuration {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client_id: ClientId::new(config.client_id().to_string()),
            client_secret: ClientSecret::new(config.client_secret().to_string()),
            auth_url,
            token_url,
            redirect_url,
            scopes: config
                .scopes()
                .into_iter()
                .map(|s| Scope::new(s.to_string()))
                .collect(),
            api_base_url: config.api_base_url().to_string(),
            http,
        })
    }
}

#[async_trait]
impl AuthProvider for OAuth2Provider {
    fn authorization_url(&self, state: &StateToken) -> String {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let (url, _) = client
            .authorize_url(|| state.as_csrf_token())
            .add_scopes(self.scopes.iter().cloned())
            .url();

        url.to_string()
    }

    #[instrument(skip_all)]
    async fn exchange(
        &self,
        expected_state: &str,
        params: &CallbackParams,
    ) -> Result<Credential, Report<ProviderError>> {
        let code = params.verify(expected_state)?;

        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let token: BasicTokenResponse = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| ProviderError::TokenExchange {
                reason: e.to_string(),
            })?;

        let expiry = token
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);

        debug!(
            has_refresh_token = token.refresh_token().is_some(),
            "exchanged authorization code"
        );

        Ok(Credential {
            access_token: token.access_token().secret().clone(),
            token_type: token_type_name(token.token_type()),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            expiry,
        })
    }

    fn new_client(&self, credential: &Credential) -> Result<ApiClient, Report<ProviderError>> {
        ApiClient::new(self.http.clone(), self.api_base_url.clone(), credential).map_err(|e| {
            ProviderError::InvalidCredential {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn token_type_name(token_type: &BasicTokenType) -> String {
    match token_type {
        BasicTokenType::Bearer => "Bearer".to_string(),
        BasicTokenType::Mac => "MAC".to_string(),
        BasicTokenType::Extension(other) => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REDIRECT: &str = "https://app.example.com/auth/callback";

    fn config_for(server: &MockServer) -> ProviderConfig {
        ProviderConfig::new("client-id".to_string(), "client-secret".to_string())
            .with_endpoints(
                format!("{}/authorize", server.uri()),
                format!("{}/api/token", server.uri()),
            )
            .with_api_base_url(format!("{}/v1", server.uri()))
    }

    fn callback(code: &str, state: &str) -> CallbackParams {
        CallbackParams {
            code: Some(code.to_string()),
            state: Some(state.to_string()),
            error: None,
        }
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let config = ProviderConfig::new("id".to_string(), "secret".to_string())
            .with_endpoints("not a url".to_string(), "also not".to_string());
        assert!(OAuth2Provider::new(&config, REDIRECT).is_err());
    }

    #[test]
    fn rejects_invalid_redirect_url() {
        let config = ProviderConfig::new("id".to_string(), "secret".to_string());
        assert!(OAuth2Provider::new(&config, "/relative/callback").is_err());
    }

    #[test]
    fn authorization_url_carries_state_and_client() {
        let config = ProviderConfig::new("client-id".to_string(), "secret".to_string())
            .with_scopes(&["user-read-private", "user-top-read"]);
        let provider = OAuth2Provider::new(&config, REDIRECT).expect("provider");
        let state = StateToken::from_secret("state-123");

        let url = provider.authorization_url(&state);
        let parsed = reqwest::Url::parse(&url).expect("valid url");
        let query: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(query.contains(&("state".to_string(), "state-123".to_string())));
        assert!(query.contains(&("client_id".to_string(), "client-id".to_string())));
        assert!(query.contains(&("response_type".to_string(), "code".to_string())));
        assert!(query.contains(&("redirect_uri".to_string(), REDIRECT.to_string())));
        assert!(query.contains(&(
            "scope".to_string(),
            "user-read-private user-top-read".to_string()
        )));
    }

    #[tokio::test]
    async fn exchange_returns_credential_with_absolute_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "BQD-access",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "AQC-refresh",
                "scope": "user-read-private"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OAuth2Provider::new(&config_for(&server), REDIRECT).expect("provider");
        let before = Utc::now();
        let credential = provider
            .exchange("s1", &callback("auth-code", "s1"))
            .await
            .expect("exchange");

        assert_eq!(credential.access_token, "BQD-access");
        assert_eq!(credential.token_type, "Bearer");
        assert_eq!(credential.refresh_token.as_deref(), Some("AQC-refresh"));
        let expiry = credential.expiry.expect("expiry");
        assert!(expiry >= before + chrono::Duration::seconds(3600));
        assert!(expiry <= Utc::now() + chrono::Duration::seconds(3600));
    }

    #[tokio::test]
    async fn exchange_with_mismatched_state_never_calls_token_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OAuth2Provider::new(&config_for(&server), REDIRECT).expect("provider");
        let result = provider.exchange("s1", &callback("auth-code", "forged")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn exchange_surfaces_token_endpoint_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Invalid authorization code"
            })))
            .mount(&server)
            .await;

        let provider = OAuth2Provider::new(&config_for(&server), REDIRECT).expect("provider");
        let err = provider
            .exchange("s1", &callback("stale", "s1"))
            .await
            .expect_err("should fail");

        assert!(err.to_string().contains("token exchange failed"));
    }

    #[test]
    fn new_client_rejects_unsendable_token() {
        let config = ProviderConfig::new("id".to_string(), "secret".to_string());
        let provider = OAuth2Provider::new(&config, REDIRECT).expect("provider");
        let credential = Credential::bearer("line\nbreak", None);

        assert!(provider.new_client(&credential).is_err());
    }
}
