//! Shared types for the chatbot workspace: errors, ids, and the
//! session event bus.

pub mod errors;
pub mod events;
pub mod id;

pub use errors::{ChatbotError, ConfigError};
pub use events::{Event, EventBus, EventRole};
pub use id::{new_correlation_id, new_id, SessionId};
