//! Pure session state machine.
//!
//! `idle -> loading -> streaming -> idle`, with `Cancel` and `Fail` leaving
//! `loading` or `streaming` for `idle` at any point. Nothing here does I/O;
//! `ChatSession` feeds transitions in arrival order.

use chrono::{DateTime, Utc};

use super::types::{SessionSnapshot, SessionStatus};
use crate::{Message, Role};

/// An input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The user sent a message; a request is about to be issued.
    Submit { content: String, at: DateTime<Utc> },
    /// A reply chunk arrived.
    Chunk { text: String, at: DateTime<Utc> },
    /// The reply stream reached its end signal.
    Complete,
    /// The request or stream failed.
    Fail(String),
    /// The user aborted the request.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("a request is already {0:?}")]
    Busy(SessionStatus),
    #[error("no request in flight")]
    NotInFlight,
}

/// Message log plus request status of one conversation.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    messages: Vec<Message>,
    status: SessionStatus,
    error: Option<String>,
}

impl SessionState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            status: SessionStatus::Idle,
            error: None,
        }
    }

    /// Apply one transition. On `Err` the state is unchanged.
    pub fn apply(&mut self, transition: Transition) -> Result<(), TransitionError> {
        match transition {
            Transition::Submit { content, at } => {
                if self.status != SessionStatus::Idle {
                    return Err(TransitionError::Busy(self.status));
                }
                self.messages.push(Message::user(content).with_timestamp(at));
                self.status = SessionStatus::Loading;
                self.error = None;
            }
            Transition::Chunk { text, at } => match self.status {
                SessionStatus::Idle => return Err(TransitionError::NotInFlight),
                SessionStatus::Loading => {
                    self.messages.push(Message::assistant(text).with_timestamp(at));
                    self.status = SessionStatus::Streaming;
                }
                SessionStatus::Streaming => {
                    if let Some(tail) = self.messages.last_mut() {
                        tail.content.push_str(&text);
                    }
                }
            },
            Transition::Complete | Transition::Cancel => {
                self.ensure_in_flight()?;
                self.status = SessionStatus::Idle;
            }
            Transition::Fail(error) => {
                self.ensure_in_flight()?;
                self.status = SessionStatus::Idle;
                self.error = Some(error);
            }
        }
        Ok(())
    }

    /// Replace the log. Only allowed while idle.
    pub fn reset(&mut self, messages: Vec<Message>) -> Result<(), TransitionError> {
        if self.status != SessionStatus::Idle {
            return Err(TransitionError::Busy(self.status));
        }
        self.messages = messages;
        self.error = None;
        Ok(())
    }

    fn ensure_in_flight(&self) -> Result<(), TransitionError> {
        if self.status == SessionStatus::Idle {
            Err(TransitionError::NotInFlight)
        } else {
            Ok(())
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    pub fn is_streaming(&self) -> bool {
        self.status == SessionStatus::Streaming
    }

    /// Content of the live assistant reply, while streaming.
    pub fn streaming_text(&self) -> Option<&str> {
        match (self.status, self.messages.last()) {
            (SessionStatus::Streaming, Some(m)) if m.role == Role::Assistant => {
                Some(m.content.as_str())
            }
            _ => None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            is_loading: self.is_loading(),
            is_streaming: self.is_streaming(),
            error: self.error.clone(),
        }
    }
}
