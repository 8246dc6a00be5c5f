//! Async request driving for ChatSession (send + stream consumption).

use chatbot_common::{Event, EventRole};
use chrono::Utc;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::manager::ChatSession;
use super::state::Transition;
use super::types::{BusyGuard, ChatError, Outcome};
use crate::AiError;

impl ChatSession {
    /// Send a user message and stream the assistant's reply into the log.
    ///
    /// Rejected with `ChatError::Busy` while another request is loading or
    /// streaming; nothing is appended in that case. Chunks are applied in
    /// arrival order. A failure leaves any partial reply in place, sets the
    /// snapshot's `error`, and is returned as `ChatError::Ai`.
    pub async fn send_message(&self, text: impl Into<String>) -> Result<Outcome, ChatError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let _guard = BusyGuard::acquire(&self.busy)?;

        // The token must be reachable before the session leaves idle.
        let token = CancellationToken::new();
        let _in_flight = InFlight::register(self, token.clone());

        self.run_request(text, &token).await
    }

    async fn run_request(&self, text: String, token: &CancellationToken) -> Result<Outcome, ChatError> {
        self.apply(Transition::Submit {
            content: text,
            at: Utc::now(),
        })
        .map_err(|_| ChatError::Busy)?;
        self.publish(Event::MessageAppended {
            session: self.id.clone(),
            role: EventRole::User,
        });

        let history = self.messages();
        debug!(session = %self.id, messages = history.len(), "opening chat stream");

        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(Outcome::Cancelled { partial: String::new() }),
            opened = self.client.stream_chat(&history) => opened,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => return self.fail(e, String::new()),
        };

        let mut received = String::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(session = %self.id, kept = received.len(), "dropping cancelled stream");
                    return Ok(Outcome::Cancelled { partial: received });
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(text)) => {
                    let first = self.is_loading();
                    let applied = self.apply(Transition::Chunk {
                        text: text.clone(),
                        at: Utc::now(),
                    });
                    if applied.is_err() {
                        // Cancelled between the select and the apply.
                        return Ok(Outcome::Cancelled { partial: received });
                    }
                    if first {
                        self.publish(Event::StreamStarted(self.id.clone()));
                        self.publish(Event::MessageAppended {
                            session: self.id.clone(),
                            role: EventRole::Assistant,
                        });
                    }
                    received.push_str(&text);
                }
                Some(Err(e)) => return self.fail(e, received),
                None => {
                    if self.apply(Transition::Complete).is_err() {
                        return Ok(Outcome::Cancelled { partial: received });
                    }
                    debug!(session = %self.id, chars = received.len(), "chat stream finished");
                    self.publish(Event::StreamFinished(self.id.clone()));
                    return Ok(Outcome::Completed { content: received });
                }
            }
        }
    }

    /// Record a failed request and turn it into the caller's error.
    ///
    /// A failure that lands after `cancel_stream` is reported as the
    /// cancellation it raced with.
    fn fail(&self, error: AiError, partial: String) -> Result<Outcome, ChatError> {
        if self.apply(Transition::Fail(error.to_string())).is_err() {
            return Ok(Outcome::Cancelled { partial });
        }
        warn!(session = %self.id, error = %error, "chat request failed");
        self.publish(Event::StreamFailed {
            session: self.id.clone(),
            error: error.to_string(),
        });
        Err(ChatError::Ai(error))
    }
}

/// Publishes the cancellation token for one request and retires it on drop.
///
/// If the `send_message` future is dropped mid-request the session is put
/// back to idle, keeping whatever was received.
struct InFlight<'a> {
    session: &'a ChatSession,
}

impl<'a> InFlight<'a> {
    fn register(session: &'a ChatSession, token: CancellationToken) -> Self {
        *session.lock_cancel() = Some(token);
        Self { session }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session.lock_cancel().take();
        if self.session.apply(Transition::Cancel).is_ok() {
            debug!(session = %self.session.id, "request abandoned mid-flight");
        }
    }
}
