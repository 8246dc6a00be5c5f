//! Session types and concurrency guards.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{AiError, Message};

/// Where the session is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No request in flight.
    #[default]
    Idle,
    /// Request issued, no chunk received yet.
    Loading,
    /// Chunks arriving; the last message is the live assistant reply.
    Streaming,
}

/// Immutable view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub is_streaming: bool,
    /// Set when the last request failed; cleared by the next send.
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub fn is_idle(&self) -> bool {
        !self.is_loading && !self.is_streaming
    }
}

/// How a `send_message` call ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The stream ran to its end signal. `content` is the full reply.
    Completed { content: String },
    /// `cancel_stream` stopped the request. `partial` is what was kept.
    Cancelled { partial: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("session is busy with another request")]
    Busy,
    #[error("message is empty")]
    EmptyMessage,
    #[error(transparent)]
    Ai(#[from] AiError),
}

/// Guard that clears the `busy` flag on drop, so it is released even if the
/// request future is dropped or returns early.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Attempt to acquire the busy flag. Returns `Err` if already held.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, ChatError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(ChatError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(matches!(BusyGuard::acquire(&flag), Err(ChatError::Busy)));
        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn default_snapshot_is_idle() {
        let snapshot = SessionSnapshot::default();
        assert!(snapshot.is_idle());
        assert!(snapshot.messages.is_empty());
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn chat_error_wraps_ai_error_transparently() {
        let err: ChatError = AiError::Timeout.into();
        assert_eq!(err.to_string(), "Timeout");
    }
}
