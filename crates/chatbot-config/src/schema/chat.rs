//! Conversation settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Assistant message every new conversation starts with. Empty disables it.
    pub greeting: String,
    /// Longest user message accepted, in characters (valid range: 1-100000).
    pub max_input_chars: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello! Ask me anything.".into(),
            max_input_chars: 4000,
        }
    }
}
