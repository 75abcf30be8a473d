//! OrderStore implementation backed by the ordering PostgreSQL database.
//!
//! This uses [sqlx] under the hood

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::{OrderStore, StoreError};
use crate::model::{OrderId, OrderStatus};

const GRACE_PERIOD_ORDERS_QUERY: &str = r#"
    SELECT "Id"
    FROM ordering.orders
    WHERE CURRENT_TIMESTAMP - "OrderDate" >= make_interval(secs => $1) AND "OrderStatus" = $2
    ORDER BY "Id"
    "#;

/// OrderStore over the `ordering.orders` table.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> PostgresOrderStore {
        PostgresOrderStore { pool }
    }

    /// Pool builder, so callers don't need to depend on sqlx directly
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use order_processor::store::PostgresOrderStore;
    /// # async fn test_fn() {
    /// let pool = PostgresOrderStore::pool()
    ///     .max_connections(5)
    ///     .connect_lazy("postgres://localhost/orderingdb")
    ///     .expect("Invalid connection string");
    /// let store = PostgresOrderStore::new(pool);
    /// # }
    /// ```
    pub fn pool() -> PgPoolOptions {
        PgPoolOptions::new()
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn find_grace_period_orders(&self, grace_period: Duration) -> Result<Vec<OrderId>, StoreError> {
        // Connection goes back to the pool when `conn` drops, on every exit path.
        let mut conn = self.pool.acquire().await?;
        let ids: Vec<i32> = sqlx::query_scalar(GRACE_PERIOD_ORDERS_QUERY)
            .bind(grace_period.as_secs_f64())
            .bind(OrderStatus::Submitted.as_str())
            .fetch_all(&mut *conn)
            .await?;
        Ok(ids.into_iter().map(OrderId).collect())
    }
}
