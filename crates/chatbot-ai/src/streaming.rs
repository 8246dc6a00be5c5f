//! Server-Sent Events (SSE) streaming parser.
//!
//! The backend streams replies as `text/event-stream`. Each event's data is
//! a JSON object `{"content": "..."}` holding one chunk of text; a
//! `data: [DONE]` event ends the reply and an event named `error` aborts it.

use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{trace, warn};

use crate::AiError;

/// Data payload that ends a reply.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event type, if an `event:` field was present.
    pub event: Option<String>,
    /// The event data; multi-line data is joined with `\n`.
    pub data: String,
}

#[derive(Deserialize)]
struct ChunkPayload {
    content: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    detail: serde_json::Value,
}

/// Parse SSE events from a buffered reader, in order.
pub fn sse_events<R>(reader: R) -> impl Stream<Item = Result<SseEvent, AiError>> + Send + 'static
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async_stream::try_stream! {
        let mut lines = reader.lines();
        let mut current_event: Option<String> = None;
        let mut current_data = String::new();

        while let Some(line) = lines.next_line().await.map_err(read_error)? {
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if line.is_empty() {
                // Empty line = end of event
                if !current_data.is_empty() {
                    yield SseEvent {
                        event: current_event.take(),
                        data: std::mem::take(&mut current_data),
                    };
                }
                current_event = None;
                continue;
            }

            if let Some(event_type) = field_value(line, "event") {
                current_event = Some(event_type.to_string());
            } else if let Some(data) = field_value(line, "data") {
                if !current_data.is_empty() {
                    current_data.push('\n');
                }
                current_data.push_str(data);
            }
            // id:, retry: and `:` comments carry nothing we use
        }

        if !current_data.is_empty() {
            yield SseEvent {
                event: current_event,
                data: current_data,
            };
        }
    }
}

/// Map a failed body read to `AiError`.
///
/// Body errors from `reqwest` arrive wrapped in `io::Error`; a timeout
/// while reading stays a `Timeout`.
pub(crate) fn read_error(e: std::io::Error) -> AiError {
    let timed_out = e.kind() == std::io::ErrorKind::TimedOut
        || e
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout);
    if timed_out {
        AiError::Timeout
    } else {
        AiError::NetworkError(e.to_string())
    }
}

/// `field: value` or `field:value`; one leading space is stripped.
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(field)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Turn backend SSE events into text chunks.
///
/// Stops at `[DONE]`, fails on an `error` event, and drops any payload that
/// is not a chunk object.
pub fn decode_chunks<S>(events: S) -> impl Stream<Item = Result<String, AiError>> + Send + 'static
where
    S: Stream<Item = Result<SseEvent, AiError>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut events = Box::pin(events);
        while let Some(event) = events.next().await {
            let event = event?;

            if event.event.as_deref() == Some("error") {
                Err::<(), AiError>(AiError::ApiError(error_detail(&event.data)))?;
            }
            if event.data.trim() == DONE_SENTINEL {
                trace!("stream end signal received");
                break;
            }

            match serde_json::from_str::<ChunkPayload>(&event.data) {
                Ok(payload) => yield payload.content,
                Err(e) => warn!(error = %e, data = %event.data, "dropping malformed stream chunk"),
            }
        }
    }
}

/// Extract a readable message from a backend error body.
///
/// FastAPI error bodies look like `{"detail": ...}` where `detail` is either
/// a string or a list of validation errors.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorPayload>(body) {
        Ok(ErrorPayload {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorPayload { detail }) => detail.to_string(),
        Err(_) => body.chars().take(200).collect(),
    }
}
