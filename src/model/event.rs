//! Integration events published by the order processor.

use crate::model::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common envelope fields of every integration event.
///
/// Each event gets a fresh `id` and `creation_date` when it is constructed,
/// so two events for the same order are still distinct messages.
pub trait IntegrationEvent: Serialize + Send + Sync {
    /// Type discriminator used by the bus to route the event.
    const EVENT_TYPE: &'static str;

    fn id(&self) -> Uuid;

    fn creation_date(&self) -> DateTime<Utc>;
}

/// Announces that an order has stayed `Submitted` past its grace period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GracePeriodConfirmedIntegrationEvent {
    pub id: Uuid,
    pub creation_date: DateTime<Utc>,
    pub order_id: OrderId,
}

impl GracePeriodConfirmedIntegrationEvent {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            id: Uuid::new_v4(),
            creation_date: Utc::now(),
            order_id,
        }
    }
}

impl IntegrationEvent for GracePeriodConfirmedIntegrationEvent {
    const EVENT_TYPE: &'static str = "GracePeriodConfirmedIntegrationEvent";

    fn id(&self) -> Uuid {
        self.id
    }

    fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }
}
