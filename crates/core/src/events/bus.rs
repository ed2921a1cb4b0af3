use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::DocumentEvent;

/// In-process event bus backed by `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<DocumentEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Deliver to current subscribers. Having none is not an error; the event is dropped.
    /// Returns how many subscribers received it.
    pub fn emit(&self, event: DocumentEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(_) => {
                tracing::trace!("event dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
