//! Order records as seen by the grace-period poller.
//!
//! The ordering store owns these rows. The poller only reads the identifier,
//! the order date and the status, and never writes them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i32);

impl From<i32> for OrderId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of an order in the ordering store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Submitted,
    AwaitingValidation,
    StockConfirmed,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    /// The value persisted in the `"OrderStatus"` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Submitted => "Submitted",
            OrderStatus::AwaitingValidation => "AwaitingValidation",
            OrderStatus::StockConfirmed => "StockConfirmed",
            OrderStatus::Paid => "Paid",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored status string is not a known [`OrderStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Submitted" => Ok(OrderStatus::Submitted),
            "AwaitingValidation" => Ok(OrderStatus::AwaitingValidation),
            "StockConfirmed" => Ok(OrderStatus::StockConfirmed),
            "Paid" => Ok(OrderStatus::Paid),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// A row of the ordering store, reduced to the fields the poller reads.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

impl OrderRecord {
    /// Creates a new OrderRecord instance.
    ///
    /// # Arguments
    /// * `id` - Identifier assigned by the ordering store
    /// * `order_date` - When the order was submitted
    /// * `status` - Current lifecycle state
    pub fn new(id: impl Into<OrderId>, order_date: DateTime<Utc>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            order_date,
            status,
        }
    }

    /// True when the order is still `Submitted` and at least `grace_period` old at `now`.
    pub fn is_past_grace_period(&self, now: DateTime<Utc>, grace_period: chrono::Duration) -> bool {
        self.status == OrderStatus::Submitted && now - self.order_date >= grace_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn status_round_trips_through_column_value() {
        for status in [
            OrderStatus::Submitted,
            OrderStatus::AwaitingValidation,
            OrderStatus::StockConfirmed,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert_eq!(
            "submitted".parse::<OrderStatus>(),
            Err(UnknownOrderStatus("submitted".to_string()))
        );
    }

    #[test]
    fn grace_period_boundary_is_inclusive() {
        let now = Utc::now();
        let grace = Duration::minutes(30);

        let exactly = OrderRecord::new(1, now - grace, OrderStatus::Submitted);
        let younger = OrderRecord::new(2, now - Duration::minutes(29), OrderStatus::Submitted);
        let shipped = OrderRecord::new(3, now - Duration::minutes(50), OrderStatus::Shipped);

        assert!(exactly.is_past_grace_period(now, grace));
        assert!(!younger.is_past_grace_period(now, grace));
        assert!(!shipped.is_past_grace_period(now, grace));
    }
}
