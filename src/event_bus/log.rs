use async_trait::async_trait;
use tracing::info;

use super::{EventBus, EventBusError, EventEnvelope};

/// A bus that only logs what it is asked to publish.
///
/// Used by the binary when no broker is wired in, so the poller can run
/// end to end against a real database.
#[derive(Debug, Clone, Default)]
pub struct LogEventBus;

#[async_trait]
impl EventBus for LogEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventBusError> {
        let payload = serde_json::to_string(&envelope.payload)?;
        info!(
            event_type = %envelope.event_type,
            event_id = %envelope.id,
            %payload,
            "Event published"
        );
        Ok(())
    }
}
