//! ChatClient trait implementation for BackendClient (whole + streaming).

use async_trait::async_trait;
use futures_util::TryStreamExt;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::streaming::{decode_chunks, sse_events};
use crate::{AiError, ChatClient, ChunkStream, Message};

use super::client::{BackendClient, ChatResponse, CHAT_PATH, CHAT_STREAM_PATH};

#[async_trait]
impl ChatClient for BackendClient {
    async fn stream_chat(&self, messages: &[Message]) -> Result<ChunkStream, AiError> {
        let response = self.post_chat(CHAT_STREAM_PATH, messages).await?;
        debug!(status = %response.status(), "chat stream opened");

        let byte_stream = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));

        Ok(Box::pin(decode_chunks(sse_events(reader))))
    }

    async fn send_message(&self, messages: &[Message]) -> Result<String, AiError> {
        let response = self.post_chat(CHAT_PATH, messages).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;
        Ok(body.response)
    }
}
