//! Chat engine for the chatbot.
//!
//! Provides:
//! - The message model shared with the backend
//! - A streaming (SSE) client for the chat backend
//! - `ChatSession`, the cancellable single-request session state machine

pub mod backend;
pub mod session;
pub mod streaming;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

pub use backend::{BackendClient, BackendConfig};
pub use session::{ChatError, ChatSession, Outcome, SessionSnapshot, SessionStatus};

/// Text chunks of one streamed reply, in arrival order. The stream ends
/// after the backend's end signal; an `Err` item ends it early.
pub type ChunkStream = BoxStream<'static, Result<String, AiError>>;

/// Outbound chat-completion calls. Every call carries the full history.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Open a streamed reply to `messages`.
    async fn stream_chat(&self, messages: &[Message]) -> Result<ChunkStream, AiError>;

    /// Request a complete reply in one shot.
    ///
    /// The default drains `stream_chat`.
    async fn send_message(&self, messages: &[Message]) -> Result<String, AiError> {
        let mut stream = self.stream_chat(messages).await?;
        let mut content = String::new();
        while let Some(chunk) = stream.next().await {
            content.push_str(&chunk?);
        }
        Ok(content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl From<Role> for chatbot_common::EventRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => chatbot_common::EventRole::User,
            Role::Assistant => chatbot_common::EventRole::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else if e.is_decode() {
            AiError::ParseError(e.to_string())
        } else {
            AiError::NetworkError(e.to_string())
        }
    }
}
