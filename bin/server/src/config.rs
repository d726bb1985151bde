//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`ProviderConfig`](tunegate_provider::ProviderConfig) for the
//! provider endpoint and client settings.

use serde::Deserialize;
use std::time::Duration;
use tunegate_provider::ProviderConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Remote provider configuration.
    pub provider: ProviderConfig,

    /// Login flow configuration.
    pub auth: AuthConfig,
}

/// Login flow configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Absolute URL the provider redirects back to after authorization.
    pub callback_url: String,

    /// Absolute URL of the application's own login entry point.
    pub ui_redirect_url: String,

    /// Upper bound on the token exchange during the callback, in seconds.
    #[serde(default = "default_exchange_timeout_seconds")]
    pub exchange_timeout_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_exchange_timeout_seconds() -> u64 {
    10
}

fn default_secure_cookies() -> bool {
    true
}

impl AuthConfig {
    /// Creates a login configuration with default timeout and secure cookies.
    #[must_use]
    pub fn new(callback_url: String, ui_redirect_url: String) -> Self {
        Self {
            callback_url,
            ui_redirect_url,
            exchange_timeout_seconds: default_exchange_timeout_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }

    /// Returns the token exchange timeout.
    #[must_use]
    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_seconds)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Nested keys use `__` as separator, e.g. `PROVIDER__CLIENT_ID` or
    /// `AUTH__CALLBACK_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
