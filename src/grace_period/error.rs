//! Error types for the grace-period poller.

use crate::event_bus::EventBusError;
use crate::model::OrderId;
use thiserror::Error;
use uuid::Uuid;

/// A confirmation event could not be published.
#[derive(Debug, Error)]
#[error("Failed to publish grace period confirmation {event_id} for order {order_id}")]
pub struct PublishError {
    /// Order whose event failed.
    pub order_id: OrderId,
    /// Id of the event that failed.
    pub event_id: Uuid,
    /// Events successfully published earlier in the same cycle.
    pub published_before: Vec<OrderId>,
    #[source]
    pub source: EventBusError,
}

/// Reasons the poll loop stops other than cancellation.
#[derive(Debug, Error)]
pub enum GracePeriodError {
    /// Publishing failed; fatal to the current run.
    #[error("Grace period loop aborted: {0}")]
    Publish(#[from] PublishError),
}
