//! The provider collaborator interface.

use async_trait::async_trait;
use rootcause::prelude::Report;
use serde::Deserialize;
use tunegate_core::Credential;
use tunegate_session::StateToken;

use crate::client::ApiClient;
use crate::error::ProviderError;

/// Query parameters the provider sends to the callback route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code to exchange.
    pub code: Option<String>,
    /// State echoed back from the authorization request.
    pub state: Option<String>,
    /// Error code when the user declined or the request was invalid.
    pub error: Option<String>,
}

impl CallbackParams {
    /// Collects the parameters from decoded query pairs.
    ///
    /// The first occurrence of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    /// Checks the callback against the expected state and returns the code.
    ///
    /// A provider error takes precedence over a state mismatch so the log
    /// shows why the user came back without a code.
    pub fn verify(&self, expected_state: &str) -> Result<&str, ProviderError> {
        if let Some(error) = &self.error {
            return Err(ProviderError::Denied {
                reason: error.clone(),
            });
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err(ProviderError::StateMismatch);
        }
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(ProviderError::MissingCode),
        }
    }
}

/// The remote provider as used by the auth adaptor.
///
/// Implementations hold only immutable configuration and are shared by all
/// requests.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the authorization endpoint URL carrying `state`.
    fn authorization_url(&self, state: &StateToken) -> String;

    /// Verifies the callback against `expected_state` and exchanges its code
    /// for a credential.
    async fn exchange(
        &self,
        expected_state: &str,
        params: &CallbackParams,
    ) -> Result<Credential, Report<ProviderError>>;

    /// Builds an API client acting with `credential`.
    ///
    /// Rate-limit retries are left disabled; callers opt in.
    fn new_client(&self, credential: &Credential) -> Result<ApiClient, Report<ProviderError>>;
}
