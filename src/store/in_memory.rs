//! In-process order store for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::debug;

use super::{OrderStore, StoreError};
use crate::model::{OrderId, OrderRecord, OrderStatus};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Default)]
struct Rows {
    orders: BTreeMap<OrderId, OrderRecord>,
    unavailable: bool,
}

/// Order store held in memory.
///
/// Cloning yields another handle to the same rows, so a test can keep one
/// handle to change order statuses while the poller queries through another.
/// The clock is injected so order ages can be controlled.
#[derive(Clone)]
pub struct InMemoryOrderStore {
    rows: Arc<RwLock<Rows>>,
    now_fn: Clock,
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrderStore {
    /// Creates an empty store that reads the system clock.
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Creates an empty store whose notion of "now" comes from `now_fn`.
    pub fn with_clock(now_fn: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            rows: Arc::new(RwLock::new(Rows::default())),
            now_fn: Arc::new(now_fn),
        }
    }

    /// Inserts or replaces an order row.
    pub fn insert(&self, order: OrderRecord) -> Result<(), StoreError> {
        let mut rows = self.write()?;
        rows.orders.insert(order.id, order);
        Ok(())
    }

    /// Changes the status of an existing order. Returns false if the order is unknown.
    pub fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<bool, StoreError> {
        let mut rows = self.write()?;
        match rows.orders.get_mut(&id) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Simulates a broken connection: while set, every query fails.
    pub fn set_unavailable(&self, unavailable: bool) -> Result<(), StoreError> {
        self.write()?.unavailable = unavailable;
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Rows>, StoreError> {
        self.rows
            .read()
            .map_err(|_| StoreError::Unavailable("order rows lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Rows>, StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::Unavailable("order rows lock poisoned".to_string()))
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_grace_period_orders(&self, grace_period: Duration) -> Result<Vec<OrderId>, StoreError> {
        let grace_period = chrono::Duration::from_std(grace_period)
            .map_err(|e| StoreError::Unavailable(format!("grace period out of range: {e}")))?;
        let now = (self.now_fn)();

        let rows = self.read()?;
        if rows.unavailable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }

        let ids: Vec<OrderId> = rows
            .orders
            .values()
            .filter(|order| order.is_past_grace_period(now, grace_period))
            .map(|order| order.id)
            .collect();
        debug!(found = ids.len(), total = rows.orders.len(), "Scanned in-memory orders");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn fixed_store() -> (InMemoryOrderStore, DateTime<Utc>) {
        let now = Utc::now();
        (InMemoryOrderStore::with_clock(move || now), now)
    }

    #[tokio::test]
    async fn returns_only_stale_submitted_orders_in_id_order() {
        let (store, now) = fixed_store();
        store.insert(OrderRecord::new(9, now - ChronoDuration::minutes(45), OrderStatus::Submitted)).unwrap();
        store.insert(OrderRecord::new(1, now - ChronoDuration::minutes(40), OrderStatus::Submitted)).unwrap();
        store.insert(OrderRecord::new(2, now - ChronoDuration::minutes(10), OrderStatus::Submitted)).unwrap();
        store.insert(OrderRecord::new(3, now - ChronoDuration::minutes(50), OrderStatus::Shipped)).unwrap();
        store.insert(OrderRecord::new(4, now - ChronoDuration::days(3), OrderStatus::Cancelled)).unwrap();

        let ids = store
            .find_grace_period_orders(Duration::from_secs(30 * 60))
            .await
            .unwrap();
        assert_eq!(ids, vec![OrderId(1), OrderId(9)]);
    }

    #[tokio::test]
    async fn status_change_removes_order_from_results() {
        let (store, now) = fixed_store();
        store.insert(OrderRecord::new(1, now - ChronoDuration::hours(1), OrderStatus::Submitted)).unwrap();
        assert!(store.set_status(OrderId(1), OrderStatus::AwaitingValidation).unwrap());
        assert!(!store.set_status(OrderId(2), OrderStatus::Paid).unwrap());

        let ids = store.find_grace_period_orders(Duration::from_secs(60)).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn unavailable_store_fails_queries() {
        let (store, _) = fixed_store();
        store.set_unavailable(true).unwrap();
        let result = store.find_grace_period_orders(Duration::from_secs(60)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        store.set_unavailable(false).unwrap();
        assert!(store.find_grace_period_orders(Duration::from_secs(60)).await.unwrap().is_empty());
    }
}
