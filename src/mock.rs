//! # Mock Collaborators
//!
//! Utilities for testing the poller without a database or a broker.
//!
//! [`MockOrderStore`] and [`MockEventBus`] answer calls from a queue of
//! expectations set up front, in order. A call with no matching expectation
//! panics, and [`verify`](MockEventBus::verify) panics if expectations are
//! left over.
//!
//! ## When to use Mocks vs In-Memory Collaborators
//!
//! | Feature | Mocks | In-memory store/bus |
//! |---------|-------|---------------------|
//! | **State** | None, scripted answers | Real rows and a real publish log |
//! | **Error Injection** | Per call (`return_err`) | Whole store/bus on or off |
//! | **Use Case** | Exact call sequences, failure on the Nth publish | Scenario tests over real filtering |
//!
//! ## Example
//!
//! ```rust
//! use order_processor::mock::{MockEventBus, MockOrderStore};
//! use order_processor::event_bus::EventBusError;
//! use order_processor::model::OrderId;
//!
//! let store = MockOrderStore::new();
//! store.expect_find().return_ok(vec![OrderId(1), OrderId(2)]);
//!
//! let bus = MockEventBus::new();
//! bus.expect_publish().return_ok();
//! bus.expect_publish().return_err(EventBusError::Rejected("broker down".into()));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::event_bus::{EventBus, EventBusError, EventEnvelope};
use crate::model::OrderId;
use crate::store::{OrderStore, StoreError};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// =============================================================================
// ORDER STORE
// =============================================================================

/// A scripted [`OrderStore`]. Cloning shares the expectation queue.
#[derive(Clone, Default)]
pub struct MockOrderStore {
    expectations: Arc<Mutex<VecDeque<Result<Vec<OrderId>, StoreError>>>>,
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl MockOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `find_grace_period_orders` call.
    pub fn expect_find(&self) -> FindExpectationBuilder {
        FindExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Grace periods passed to each call so far.
    pub fn calls(&self) -> Vec<Duration> {
        lock(&self.calls).clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining != 0 {
            panic!("Not all store expectations were met. {} remaining", remaining);
        }
    }
}

#[async_trait]
impl OrderStore for MockOrderStore {
    async fn find_grace_period_orders(&self, grace_period: Duration) -> Result<Vec<OrderId>, StoreError> {
        lock(&self.calls).push(grace_period);
        let expectation = lock(&self.expectations).pop_front();
        match expectation {
            Some(response) => response,
            None => panic!("Unexpected find_grace_period_orders call"),
        }
    }
}

/// Builder for `find_grace_period_orders` expectations.
pub struct FindExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Result<Vec<OrderId>, StoreError>>>>,
}

impl FindExpectationBuilder {
    /// Sets the expectation to return these ids.
    pub fn return_ok(self, ids: Vec<OrderId>) {
        lock(&self.expectations).push_back(Ok(ids));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        lock(&self.expectations).push_back(Err(error));
    }
}

// =============================================================================
// EVENT BUS
// =============================================================================

struct PublishExpectation {
    delay: Option<Duration>,
    response: Result<(), EventBusError>,
}

/// A scripted [`EventBus`]. Cloning shares the expectation queue.
#[derive(Clone, Default)]
pub struct MockEventBus {
    expectations: Arc<Mutex<VecDeque<PublishExpectation>>>,
    attempted: Arc<Mutex<Vec<EventEnvelope>>>,
    published: Arc<Mutex<Vec<EventEnvelope>>>,
}

impl MockEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `publish` call.
    pub fn expect_publish(&self) -> PublishExpectationBuilder {
        PublishExpectationBuilder {
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Every envelope passed to `publish`, including failed ones.
    pub fn attempted(&self) -> Vec<EventEnvelope> {
        lock(&self.attempted).clone()
    }

    /// Envelopes whose publish call succeeded.
    pub fn published(&self) -> Vec<EventEnvelope> {
        lock(&self.published).clone()
    }

    /// Order ids of successfully published envelopes.
    pub fn published_order_ids(&self) -> Vec<OrderId> {
        self.published()
            .iter()
            .filter_map(|e| e.payload["OrderId"].as_i64())
            .map(|id| OrderId(id as i32))
            .collect()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining != 0 {
            panic!("Not all publish expectations were met. {} remaining", remaining);
        }
    }
}

#[async_trait]
impl EventBus for MockEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventBusError> {
        lock(&self.attempted).push(envelope.clone());
        let expectation = lock(&self.expectations).pop_front();
        let Some(expectation) = expectation else {
            panic!("Unexpected publish call for {}", envelope.payload);
        };

        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        if expectation.response.is_ok() {
            lock(&self.published).push(envelope);
        }
        expectation.response
    }
}

/// Builder for `publish` expectations.
pub struct PublishExpectationBuilder {
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<PublishExpectation>>>,
}

impl PublishExpectationBuilder {
    /// Makes the publish call take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to succeed.
    pub fn return_ok(self) {
        lock(&self.expectations).push_back(PublishExpectation {
            delay: self.delay,
            response: Ok(()),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: EventBusError) {
        lock(&self.expectations).push_back(PublishExpectation {
            delay: self.delay,
            response: Err(error),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GracePeriodConfirmedIntegrationEvent;

    #[tokio::test]
    async fn store_answers_in_expectation_order() {
        let store = MockOrderStore::new();
        store.expect_find().return_ok(vec![OrderId(3)]);
        store.expect_find().return_err(StoreError::Unavailable("down".into()));

        let first = store.find_grace_period_orders(Duration::from_secs(60)).await.unwrap();
        assert_eq!(first, vec![OrderId(3)]);
        assert!(store.find_grace_period_orders(Duration::from_secs(60)).await.is_err());
        assert_eq!(store.calls(), vec![Duration::from_secs(60); 2]);
        store.verify();
    }

    #[tokio::test]
    async fn bus_separates_attempted_from_published() {
        let bus = MockEventBus::new();
        bus.expect_publish().return_ok();
        bus.expect_publish().return_err(EventBusError::Closed);

        let first = EventEnvelope::from_event(&GracePeriodConfirmedIntegrationEvent::new(OrderId(1))).unwrap();
        let second = EventEnvelope::from_event(&GracePeriodConfirmedIntegrationEvent::new(OrderId(2))).unwrap();
        bus.publish(first).await.unwrap();
        assert!(matches!(bus.publish(second).await, Err(EventBusError::Closed)));

        assert_eq!(bus.attempted().len(), 2);
        assert_eq!(bus.published_order_ids(), vec![OrderId(1)]);
        bus.verify();
    }

    #[test]
    #[should_panic(expected = "Not all publish expectations were met")]
    fn verify_panics_on_leftover_expectations() {
        let bus = MockEventBus::new();
        bus.expect_publish().return_ok();
        bus.verify();
    }
}
