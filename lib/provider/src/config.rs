//! Provider endpoint and client registration configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the remote OAuth2 provider.
///
/// Only the client credentials are required; endpoints default to the
/// Spotify accounts service and Web API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// Authorization endpoint the browser is redirected to.
    #[serde(default = "default_auth_url")]
    auth_url: String,
    /// Token endpoint used for the code exchange.
    #[serde(default = "default_token_url")]
    token_url: String,
    /// Base URL of the provider's resource API.
    #[serde(default = "default_api_base_url")]
    api_base_url: String,
    /// Scopes to request as a comma-separated string.
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Timeout for each HTTP request to the provider.
    #[serde(default = "default_request_timeout_seconds")]
    request_timeout_seconds: u64,
}

fn default_auth_url() -> String {
    "https://accounts.spotify.com/authorize".to_string()
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_scopes() -> String {
    [
        "user-read-private",
        "playlist-read-private",
        "playlist-modify-private",
        "playlist-modify-public",
        "user-top-read",
        "user-read-currently-playing",
        "user-read-playback-state",
    ]
    .join(",")
}

fn default_request_timeout_seconds() -> u64 {
    10
}

impl ProviderConfig {
    /// Creates a configuration with default endpoints and scopes.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            scopes: default_scopes(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }

    /// Overrides the authorization and token endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, auth_url: String, token_url: String) -> Self {
        self.auth_url = auth_url;
        self.token_url = token_url;
        self
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: String) -> Self {
        self.api_base_url = api_base_url;
        self
    }

    /// Replaces the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = scopes.join(",");
        self
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the authorization endpoint.
    #[must_use]
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Returns the token endpoint.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Returns the scopes to request, parsed from the comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_has_spotify_defaults() {
        let config = ProviderConfig::new("id".to_string(), "secret".to_string());

        assert_eq!(config.client_id(), "id");
        assert_eq!(config.client_secret(), "secret");
        assert_eq!(config.auth_url(), "https://accounts.spotify.com/authorize");
        assert_eq!(config.token_url(), "https://accounts.spotify.com/api/token");
        assert_eq!(config.api_base_url(), "https://api.spotify.com/v1");
        assert_eq!(config.scopes().len(), 7);
        assert!(config.scopes().contains(&"user-read-private"));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let json = r#"{ "client_id": "id", "client_secret": "secret" }"#;
        let config: ProviderConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.token_url(), "https://accounts.spotify.com/api/token");
        assert!(config.scopes().contains(&"playlist-modify-public"));
    }

    #[test]
    fn scopes_parses_comma_separated() {
        let json = r#"{
            "client_id": "id",
            "client_secret": "secret",
            "scopes": "user-read-private, user-top-read,"
        }"#;
        let config: ProviderConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.scopes(), vec!["user-read-private", "user-top-read"]);
    }

    #[test]
    fn overrides_apply() {
        let config = ProviderConfig::new("id".to_string(), "secret".to_string())
            .with_endpoints(
                "http://localhost:9000/authorize".to_string(),
                "http://localhost:9000/api/token".to_string(),
            )
            .with_api_base_url("http://localhost:9000/v1".to_string())
            .with_scopes(&["user-read-email"]);

        assert_eq!(config.auth_url(), "http://localhost:9000/authorize");
        assert_eq!(config.token_url(), "http://localhost:9000/api/token");
        assert_eq!(config.api_base_url(), "http://localhost:9000/v1");
        assert_eq!(config.scopes(), vec!["user-read-email"]);
    }
}
