//! Logs session lifecycle events published on the bus.

use chatbot_common::{Event, EventBus};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Log events until `Shutdown` or the bus closes.
///
/// Subscribes before returning, so nothing published afterwards is missed.
/// The task yields the number of events it logged.
pub fn spawn(bus: &EventBus) -> JoinHandle<usize> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        let mut logged = 0;
        loop {
            match rx.recv().await {
                Ok(Event::Shutdown) | Err(RecvError::Closed) => break,
                Ok(event) => {
                    debug!(?event, "session event");
                    logged += 1;
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event log fell behind"),
            }
        }
        logged
    })
}
