//! Backend client struct, request sending, and status handling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::streaming::error_detail;
use crate::{AiError, Message};

use super::config::BackendConfig;

pub(crate) const CHAT_PATH: &str = "chat";
pub(crate) const CHAT_STREAM_PATH: &str = "chat/stream";
pub(crate) const HEALTH_PATH: &str = "health";
pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub messages: &'a [Message],
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    pub response: String,
}

/// Chat backend client.
pub struct BackendClient {
    pub(crate) config: BackendConfig,
    pub(crate) http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Probe `GET /health`; any 2xx counts as healthy.
    pub async fn health_check(&self) -> Result<(), AiError> {
        let url = self.config.endpoint(HEALTH_PATH);
        debug!(%url, "backend health check");
        let response = self.http.get(&url).send().await?;
        check_status(response).await.map(|_| ())
    }

    /// POST the conversation to `path` and return the successful response.
    pub(crate) async fn post_chat(
        &self,
        path: &str,
        messages: &[Message],
    ) -> Result<reqwest::Response, AiError> {
        let url = self.config.endpoint(path);
        let request_id = chatbot_common::new_correlation_id();
        debug!(%url, %request_id, messages = messages.len(), "chat request");

        let response = self
            .http
            .post(&url)
            .header(REQUEST_ID_HEADER, &request_id)
            .json(&ChatRequest { messages })
            .send()
            .await?;

        check_status(response).await
    }
}

/// Map non-success statuses to `AiError`.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AiError::RateLimited);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AiError::ApiError(format!(
            "HTTP {status}: {}",
            error_detail(&body)
        )));
    }
    Ok(response)
}
