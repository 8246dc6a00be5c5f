//! Chat backend connection settings.

use serde::{Deserialize, Serialize};

/// Where and how to reach the chat backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend; `/chat`, `/chat/stream` and `/health`
    /// are resolved against it.
    pub base_url: String,
    /// TCP connect timeout in seconds (valid range: 1-600).
    pub connect_timeout_secs: u32,
    /// Whole-request timeout in seconds, streaming included (valid range: 1-600).
    pub request_timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}
