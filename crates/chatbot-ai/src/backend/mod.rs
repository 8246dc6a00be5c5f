//! HTTP client for the chat backend.
//!
//! The backend exposes `POST /chat` (whole reply), `POST /chat/stream`
//! (SSE reply) and `GET /health`. Both chat endpoints take
//! `{"messages": [...]}` carrying the full conversation.

mod api;
mod client;
mod config;


pub use client::BackendClient;
pub use config::BackendConfig;
