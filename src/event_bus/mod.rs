//! # Event Bus
//!
//! The publishing collaborator of the grace-period poller.
//!
//! Events are wrapped in an [`EventEnvelope`] (type discriminator, event id,
//! creation date and JSON payload) and handed to an [`EventBus`]. Delivery
//! guarantees belong to the bus implementation, not to the publisher.
//!
//! - [`InMemoryEventBus`] records envelopes and fans them out to in-process subscribers.
//! - [`LogEventBus`] writes envelopes to the log.

pub mod in_memory;
pub mod log;

pub use in_memory::InMemoryEventBus;
pub use log::LogEventBus;

use crate::model::IntegrationEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors raised by an event bus while publishing.
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Event rejected by bus: {0}")]
    Rejected(String),
    #[error("Event bus closed")]
    Closed,
}

/// A serialized integration event, ready for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: String,
    pub id: Uuid,
    pub creation_date: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    pub fn from_event<E: IntegrationEvent>(event: &E) -> Result<Self, EventBusError> {
        Ok(Self {
            event_type: E::EVENT_TYPE.to_string(),
            id: event.id(),
            creation_date: event.creation_date(),
            payload: serde_json::to_value(event)?,
        })
    }

    /// Deserializes the payload back into a concrete event type.
    pub fn decode<E: IntegrationEvent + serde::de::DeserializeOwned>(&self) -> Result<E, EventBusError> {
        if self.event_type != E::EVENT_TYPE {
            return Err(EventBusError::Rejected(format!(
                "expected {}, got {}",
                E::EVENT_TYPE,
                self.event_type
            )));
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Publishes integration events to an external message bus.
///
/// The poller reuses one bus sequentially across cycles and never locks
/// around it; implementations must be safe for that.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventBusError>;
}

#[async_trait]
impl<B: EventBus + ?Sized> EventBus for std::sync::Arc<B> {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventBusError> {
        (**self).publish(envelope).await
    }
}
