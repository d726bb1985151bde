//! Per-request client for the provider's resource API.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue, RETRY_AFTER};
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use tunegate_core::Credential;

use crate::error::ApiError;

/// Maximum number of rate-limited attempts retried before giving up.
const MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Wait used when a 429 response carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECONDS: u64 = 1;

/// The authenticated user's profile as returned by the provider.
///
/// Well-known fields are typed; everything else is kept so the profile can
/// be passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Calls the provider API on behalf of one authenticated user.
///
/// Built fresh for every request from the credential in that request; it is
/// never shared between requests.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base_url: String,
    authorization: HeaderValue,
    auto_retry: bool,
}

impl ApiClient {
    /// Creates a client sending `credential` as a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token cannot be sent in a header.
    pub fn new(
        http: reqwest::Client,
        api_base_url: String,
        credential: &Credential,
    ) -> Result<Self, Report<ApiError>> {
        let mut authorization = HeaderValue::from_str(&format!(
            "Bearer {}",
            credential.access_token
        ))
        .map_err(|e| ApiError::RequestFailed {
            reason: format!("access token is not a valid header value: {e}"),
        })?;
        authorization.set_sensitive(true);

        Ok(Self {
            http,
            api_base_url,
            authorization,
            auto_retry: false,
        })
    }

    /// Enables or disables waiting out `429 Too Many Requests` responses.
    pub fn set_auto_retry(&mut self, auto_retry: bool) {
        self.auto_retry = auto_retry;
    }

    /// Returns true if rate-limited requests are retried.
    #[must_use]
    pub fn auto_retry(&self) -> bool {
        self.auto_retry
    }

    /// Fetches the profile of the user owning the credential.
    pub async fn current_user(&self) -> Result<UserProfile, Report<ApiError>> {
        self.get_json("me").await
    }

    #[instrument(skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Report<ApiError>> {
        let url = format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut retries = 0;

        loop {
            let response = self
                .http
                .get(&url)
                .header(AUTHORIZATION, self.authorization.clone())
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed {
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_seconds(&response);
                if !self.auto_retry || retries >= MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited {
                        retry_after_secs: retry_after,
                    }
                    .into());
                }
                let wait = retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECONDS);
                retries += 1;
                debug!(wait_secs = wait, attempt = retries, "rate limited, retrying");
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                }
                .into());
            }

            return response.json::<T>().await.map_err(|e| {
                ApiError::InvalidResponse {
                    reason: e.to_string(),
                }
                .into()
            });
        }
    }
}

fn retry_after_seconds(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(
            reqwest::Client::new(),
            format!("{}/v1/", server.uri()),
            &Credential::bearer("BQD-access", None),
        )
        .expect("client")
    }

    fn profile_json() -> serde_json::Value {
        serde_json::json!({
            "id": "wizzler",
            "display_name": "JM Wizzler",
            "country": "SE",
            "followers": { "href": null, "total": 3829 },
            "type": "user"
        })
    }

    #[tokio::test]
    async fn current_user_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("authorization", "Bearer BQD-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server).current_user().await.expect("profile");

        assert_eq!(profile.id, "wizzler");
        assert_eq!(profile.display_name.as_deref(), Some("JM Wizzler"));
        assert_eq!(profile.extra["followers"]["total"], 3829);
    }

    #[tokio::test]
    async fn profile_passes_unknown_fields_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .mount(&server)
            .await;

        let profile = client_for(&server).current_user().await.expect("profile");
        let json = serde_json::to_value(&profile).expect("serialize");

        assert_eq!(json, profile_json());
    }

    #[tokio::test]
    async fn rate_limited_request_is_retried_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.set_auto_retry(true);
        let profile = client.current_user().await.expect("profile");

        assert_eq!(profile.id, "wizzler");
    }

    #[tokio::test]
    async fn rate_limited_request_fails_without_auto_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .current_user()
            .await
            .expect_err("should be rate limited");

        assert!(err.to_string().contains("retry after 7s"));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("The access token expired"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .current_user()
            .await
            .expect_err("should fail");

        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn auto_retry_is_off_by_default() {
        let client = ApiClient::new(
            reqwest::Client::new(),
            "https://api.example.com/v1".to_string(),
            &Credential::bearer("token", None),
        )
        .expect("client");
        assert!(!client.auto_retry());
    }
}
