use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::SessionId;

/// Author of an appended message, as seen by event consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventRole {
    User,
    Assistant,
}

/// Lifecycle events published by a chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    MessageAppended { session: SessionId, role: EventRole },
    StreamStarted(SessionId),
    StreamFinished(SessionId),
    StreamCancelled(SessionId),
    StreamFailed { session: SessionId, error: String },
    Shutdown,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let sid = SessionId::new();

        bus.publish(Event::StreamStarted(sid.clone()));

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::StreamStarted(ref s) if *s == sid));
    }

    #[tokio::test]
    async fn lifecycle_events_arrive_in_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let sid = SessionId::new();

        bus.publish(Event::MessageAppended {
            session: sid.clone(),
            role: EventRole::User,
        });
        bus.publish(Event::StreamStarted(sid.clone()));
        bus.publish(Event::StreamFailed {
            session: sid.clone(),
            error: "HTTP 500".into(),
        });

        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::MessageAppended { role: EventRole::User, .. }
        ));
        assert!(matches!(rx.recv().await.unwrap(), Event::StreamStarted(_)));
        assert!(
            matches!(rx.recv().await.unwrap(), Event::StreamFailed { ref error, .. } if error == "HTTP 500")
        );
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(Event::Shutdown), 2);
        assert!(matches!(rx1.recv().await.unwrap(), Event::Shutdown));
        assert!(matches!(rx2.recv().await.unwrap(), Event::Shutdown));
    }

    #[test]
    fn publish_without_subscribers_returns_zero() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(Event::Shutdown), 0);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"SomethingNew","data":null}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert!(matches!(event, Event::Unknown));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&EventRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
