//! HTTP client for the Fastprint product feed.
//!
//! The feed is a single endpoint that takes the daily credentials as form
//! fields and answers with an [`ApiEnvelope`]. API-level failures
//! (`"error": 1`) surface as [`FetchError::Api`].

use std::time::Duration;

use katalog_core::config::{DEFAULT_API_BASE_URL, DEFAULT_API_USER_AGENT};
use katalog_core::lenient::{value_as_i64, value_as_text};
use katalog_core::{AppConfig, FeedConfig};
use reqwest::{Client, Url};

use crate::credentials::Credentials;
use crate::error::FetchError;
use crate::types::ApiEnvelope;

/// Client for the Fastprint feed.
///
/// Use [`FastprintClient::from_config`] in binaries and
/// [`FastprintClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct FastprintClient {
    client: Client,
    endpoint: Url,
}

impl FastprintClient {
    /// Creates a client pointed at the production feed.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_API_BASE_URL, timeout_secs, DEFAULT_API_USER_AGENT)
    }

    /// # Errors
    ///
    /// See [`FastprintClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::from_feed_config(&config.feed())
    }

    /// # Errors
    ///
    /// See [`FastprintClient::with_base_url`].
    pub fn from_feed_config(config: &FeedConfig) -> Result<Self, FetchError> {
        Self::with_base_url(
            &config.api_base_url,
            config.api_timeout_secs,
            &config.api_user_agent,
        )
    }

    /// Creates a client for an arbitrary endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`FetchError::InvalidUrl`] if `endpoint` does not parse.
    pub fn with_base_url(
        endpoint: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let endpoint = Url::parse(endpoint).map_err(|e| FetchError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetches the feed with today's credentials.
    ///
    /// # Errors
    ///
    /// See [`FastprintClient::fetch_with`].
    pub async fn fetch(&self) -> Result<ApiEnvelope, FetchError> {
        self.fetch_with(&Credentials::current()).await
    }

    /// POSTs `credentials` to the feed and decodes the envelope.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Http`] on network failure or timeout.
    /// - [`FetchError::UnexpectedStatus`] on a non-2xx response.
    /// - [`FetchError::Deserialize`] if the body is not a JSON envelope.
    /// - [`FetchError::Api`] if the feed reports `"error": 1`.
    pub async fn fetch_with(&self, credentials: &Credentials) -> Result<ApiEnvelope, FetchError> {
        tracing::info!(
            username = %credentials.username,
            endpoint = %self.endpoint,
            "fetching product feed"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::info!(status = status.as_u16(), "product feed responded");
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
                context: self.endpoint.to_string(),
                source: e,
            })?;
        Self::check_api_error(&value)?;

        let envelope: ApiEnvelope =
            serde_json::from_value(value).map_err(|e| FetchError::Deserialize {
                context: "feed envelope".to_string(),
                source: e,
            })?;

        tracing::debug!(
            records = envelope.data.len(),
            version = envelope.version.as_deref().unwrap_or("-"),
            "product feed decoded"
        );
        Ok(envelope)
    }

    /// Checked on the raw value so that an error reply is reported as such
    /// even when the rest of its body does not decode.
    fn check_api_error(body: &serde_json::Value) -> Result<(), FetchError> {
        if body.get("error").and_then(value_as_i64) == Some(1) {
            let msg = body
                .get("ket")
                .and_then(value_as_text)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(FetchError::Api(msg));
        }
        Ok(())
    }
}
