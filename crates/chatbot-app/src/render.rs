//! Incremental transcript rendering from session snapshots.
//!
//! Snapshots can be coalesced by the watch channel, so rendering works from
//! state rather than from individual chunks: each update prints whatever the
//! terminal has not shown yet.

use chatbot_ai::{Role, SessionSnapshot};

pub const ASSISTANT_PREFIX: &str = "bot> ";

/// Tracks how much of the conversation has been written.
#[derive(Debug, Default)]
pub struct Transcript {
    /// Messages fully written (or skipped, for user lines the terminal echoed).
    done: usize,
    /// Bytes of message `done` written so far while it streams.
    partial: usize,
    /// Whether the prefix of message `done` has been written.
    started: bool,
    last_error: Option<String>,
}

impl Transcript {
    /// Text to append to the terminal to bring it up to `snapshot`.
    pub fn update(&mut self, snapshot: &SessionSnapshot) -> String {
        if snapshot.messages.len() < self.done {
            // Conversation was cleared.
            *self = Self::default();
        }

        let mut out = String::new();
        let count = snapshot.messages.len();
        for (i, msg) in snapshot.messages.iter().enumerate().skip(self.done) {
            if msg.role == Role::Assistant {
                if !self.started {
                    out.push_str(ASSISTANT_PREFIX);
                    self.started = true;
                }
                out.push_str(msg.content.get(self.partial..).unwrap_or_default());

                let live = i + 1 == count && snapshot.is_streaming;
                if live {
                    self.partial = msg.content.len();
                    break;
                }
                out.push('\n');
            }
            self.partial = 0;
            self.started = false;
            self.done = i + 1;
        }

        if snapshot.error != self.last_error {
            if let Some(ref error) = snapshot.error {
                out.push_str(&format!("[error] {error}\n"));
            }
            self.last_error = snapshot.error.clone();
        }
        out
    }
}
