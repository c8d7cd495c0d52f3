use super::types::{ChatReply, ChatRequest};
use crate::config::BackendConfig;
use crate::{MoodchatError, Result};
use tracing::debug;

/// HTTP client for the chat endpoint
#[derive(Clone)]
pub struct BackendClient {
    config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| MoodchatError::ConfigError(format!("HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// Perform one exchange: POST the trimmed user text, parse the reply.
    ///
    /// A non-2xx status or a body that does not match the documented
    /// shape is an error; the caller collapses all failure kinds into
    /// the same terminal outcome.
    pub async fn exchange(&self, message: &str) -> Result<ChatReply> {
        debug!(endpoint = %self.config.endpoint, "sending chat exchange");

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| MoodchatError::TransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MoodchatError::BackendError(if detail.is_empty() {
                format!("status {status}")
            } else {
                format!("status {status}: {detail}")
            }));
        }

        response
            .json::<ChatReply>()
            .await
            .map_err(|e| MoodchatError::MalformedReply(e.to_string()))
    }
}
