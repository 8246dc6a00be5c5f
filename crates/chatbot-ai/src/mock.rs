//! Scripted `ChatClient` for session tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{AiError, ChatClient, ChunkStream, Message};

/// One step of a scripted reply.
#[derive(Clone)]
pub(crate) enum MockStep {
    /// Yield a chunk.
    Chunk(String),
    /// Yield an error item (ends the reply).
    Error(AiError),
    /// Notify the test that the stream got this far.
    Reached(Arc<Notify>),
    /// Hold the stream until the test notifies.
    Wait(Arc<Notify>),
    /// Never yield again.
    Hang,
}

impl MockStep {
    pub(crate) fn chunk(text: &str) -> Self {
        MockStep::Chunk(text.to_string())
    }
}

/// What a single `stream_chat` call does.
#[derive(Clone)]
pub(crate) enum MockReply {
    Stream(Vec<MockStep>),
    /// The request itself fails before any stream exists.
    Reject(AiError),
}

pub(crate) struct MockChatClient {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockChatClient {
    /// One streamed reply per inner vec, consumed in call order.
    pub(crate) fn new(streams: Vec<Vec<MockStep>>) -> Self {
        Self::with_replies(streams.into_iter().map(MockReply::Stream).collect())
    }

    pub(crate) fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Histories received so far, one per call.
    pub(crate) fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn stream_chat(&self, messages: &[Message]) -> Result<ChunkStream, AiError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockReply::Stream(Vec::new()));

        let steps = match reply {
            MockReply::Reject(e) => return Err(e),
            MockReply::Stream(steps) => steps,
        };

        Ok(Box::pin(async_stream::stream! {
            for step in steps {
                match step {
                    MockStep::Chunk(text) => yield Ok(text),
                    MockStep::Error(e) => {
                        yield Err(e);
                        return;
                    }
                    MockStep::Reached(notify) => notify.notify_one(),
                    MockStep::Wait(notify) => notify.notified().await,
                    MockStep::Hang => std::future::pending::<()>().await,
                }
            }
        }))
    }
}
