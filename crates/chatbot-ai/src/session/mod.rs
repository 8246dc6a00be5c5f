//! Conversation session management.
//!
//! A `ChatSession` owns the message log of one conversation and drives at
//! most one streamed reply at a time. State changes go through the pure
//! transition function in [`state`]; renderers observe immutable
//! [`SessionSnapshot`]s.

mod chat;
mod manager;
pub mod state;
mod types;


pub use manager::ChatSession;
pub use state::{SessionState, Transition, TransitionError};
pub use types::{ChatError, Outcome, SessionSnapshot, SessionStatus};
