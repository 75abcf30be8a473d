use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use super::{EventBus, EventBusError, EventEnvelope};

/// An event bus that keeps everything in process.
///
/// Published envelopes are appended to a shared log and broadcast to any
/// subscribers. Cloning gives another handle to the same bus. Publishing can
/// be switched off with [`InMemoryEventBus::reject_publishes`] to simulate a
/// broker outage.
#[derive(Clone)]
pub struct InMemoryEventBus {
    published: Arc<Mutex<Vec<EventEnvelope>>>,
    sender: broadcast::Sender<EventEnvelope>,
    rejecting: Arc<AtomicBool>,
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl InMemoryEventBus {
    /// Creates a bus whose subscribers may lag by at most `capacity` envelopes.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            sender,
            rejecting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Snapshot of every envelope published so far, in publish order.
    pub fn published(&self) -> Vec<EventEnvelope> {
        match self.published.lock() {
            Ok(published) => published.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn reject_publishes(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventBusError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(EventBusError::Rejected("broker unreachable".to_string()));
        }
        self.published
            .lock()
            .map_err(|_| EventBusError::Closed)?
            .push(envelope.clone());
        // No subscribers is not an error for a fan-out bus.
        let _ = self.sender.send(envelope);
        Ok(())
    }
}
