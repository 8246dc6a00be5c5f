//! ChatSession struct and conversation management.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use chatbot_common::{Event, EventBus, SessionId};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::state::{SessionState, Transition, TransitionError};
use super::types::{BusyGuard, ChatError, SessionSnapshot};
use crate::{ChatClient, Message};

/// One conversation with a chat backend.
///
/// Share it behind an `Arc`: `send_message` runs on one task while
/// `cancel_stream` and `snapshot` can be called from any other.
pub struct ChatSession {
    pub(super) id: SessionId,
    pub(super) client: Arc<dyn ChatClient>,
    pub(super) state: Mutex<SessionState>,
    /// Messages the log starts from, and returns to on `clear`.
    pub(super) initial: Vec<Message>,
    pub(super) snapshots: watch::Sender<SessionSnapshot>,
    /// Token of the request in flight, if any.
    pub(super) cancel: Mutex<Option<CancellationToken>>,
    pub(super) events: Option<Arc<EventBus>>,
    /// Held for the whole of a `send_message` call.
    pub(super) busy: AtomicBool,
}

impl ChatSession {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        let state = SessionState::default();
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            id: SessionId::new(),
            client,
            state: Mutex::new(state),
            initial: Vec::new(),
            snapshots,
            cancel: Mutex::new(None),
            events: None,
            busy: AtomicBool::new(false),
        }
    }

    /// Start the conversation from `messages`, e.g. a greeting.
    pub fn with_initial_messages(mut self, messages: Vec<Message>) -> Self {
        let state = SessionState::new(messages.clone());
        self.snapshots.send_replace(state.snapshot());
        self.state = Mutex::new(state);
        self.initial = messages;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current state as an immutable snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_state().snapshot()
    }

    /// Watch the latest snapshot; it changes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().messages().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading()
    }

    pub fn is_streaming(&self) -> bool {
        self.lock_state().is_streaming()
    }

    /// Abort the request in flight.
    ///
    /// The session is idle when this returns; any partial reply is kept as
    /// final. Returns `false` if there was nothing to cancel.
    pub fn cancel_stream(&self) -> bool {
        // The token is taken under the same lock as the transition, so it is
        // always the token of the request that was cancelled.
        let token = {
            let mut state = self.lock_state();
            if state.apply(Transition::Cancel).is_err() {
                return false;
            }
            self.snapshots.send_replace(state.snapshot());
            self.lock_cancel().take()
        };
        if let Some(token) = token {
            token.cancel();
        }
        debug!(session = %self.id, "stream cancelled");
        self.publish(Event::StreamCancelled(self.id.clone()));
        true
    }

    /// Reset the log to the initial messages. Fails while a request is in flight.
    pub fn clear(&self) -> Result<(), ChatError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let mut state = self.lock_state();
        state
            .reset(self.initial.clone())
            .map_err(|_| ChatError::Busy)?;
        self.snapshots.send_replace(state.snapshot());
        Ok(())
    }

    /// Apply a transition and publish the resulting snapshot.
    ///
    /// Publishing happens under the state lock so watchers never see
    /// snapshots out of order.
    pub(super) fn apply(&self, transition: Transition) -> Result<(), TransitionError> {
        let mut state = self.lock_state();
        state.apply(transition)?;
        self.snapshots.send_replace(state.snapshot());
        Ok(())
    }

    pub(super) fn publish(&self, event: Event) {
        if let Some(ref bus) = self.events {
            bus.publish(event);
        }
    }

    pub(super) fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(super) fn lock_cancel(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.cancel.lock().unwrap_or_else(|e| e.into_inner())
    }
}
