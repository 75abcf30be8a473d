//! # Order Store
//!
//! The storage collaborator of the grace-period poller. An [`OrderStore`]
//! answers one question: which orders are still `Submitted` after the grace
//! period has elapsed?
//!
//! - [`PostgresOrderStore`] queries the `ordering.orders` table through [sqlx].
//! - [`InMemoryOrderStore`] keeps rows in memory with an injectable clock.
//!
//! Implementations report failures as [`StoreError`]. Deciding what a failure
//! means for a poll cycle is the poller's job, not the store's.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;

use crate::model::OrderId;
use async_trait::async_trait;
use std::time::Duration;

/// Errors raised while connecting to or querying the order store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to orders that have outlived their grace period.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Ids of orders with status `Submitted` whose age is at least `grace_period`,
    /// in ascending id order.
    async fn find_grace_period_orders(&self, grace_period: Duration) -> Result<Vec<OrderId>, StoreError>;
}

#[async_trait]
impl<S: OrderStore + ?Sized> OrderStore for std::sync::Arc<S> {
    async fn find_grace_period_orders(&self, grace_period: Duration) -> Result<Vec<OrderId>, StoreError> {
        (**self).find_grace_period_orders(grace_period).await
    }
}
