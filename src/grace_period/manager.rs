//! # Poll Loop
//!
//! [`GracePeriodManager`] runs the poll loop as an explicit state machine:
//!
//! ```text
//!            start                 cycle done
//!   ───────▶ Running ─────────────────────────▶ Sleeping
//!               ▲                                   │
//!               └──────────── interval elapsed ─────┘
//!
//!   cancellation (between cycles or while sleeping) ──▶ Stopped
//!   publish failure                                 ──▶ Stopped (with error)
//! ```
//!
//! Cancellation is checked before each cycle and raced against the sleep, so
//! a long interval never delays shutdown. A cycle that has already started is
//! allowed to finish.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::{GracePeriodError, PublishError};
use super::query::GracePeriodQuery;
use crate::config::BackgroundTaskOptions;
use crate::event_bus::{EventBus, EventBusError, EventEnvelope};
use crate::model::{GracePeriodConfirmedIntegrationEvent, OrderId};
use crate::store::OrderStore;
use crate::telemetry::{CycleOutcome, ObservabilityContext, CHECK_ORDERS_METHOD, GET_ORDERS_METHOD};

/// Where the poll loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// A cycle is executing (query and publish).
    Running,
    /// Waiting for the next cycle.
    Sleeping,
    /// The loop has returned, or has not started yet.
    Stopped,
}

/// What one poll cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Orders an event was published for, in publish order.
    pub published: Vec<OrderId>,
    pub outcome: CycleOutcome,
    pub elapsed: Duration,
}

/// Totals over one call to [`GracePeriodManager::run`] that ended by cancellation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub events_published: u64,
    pub degraded_cycles: u64,
}

impl RunSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.events_published += report.published.len() as u64;
        if report.outcome == CycleOutcome::QueryFailed {
            self.degraded_cycles += 1;
        }
    }
}

/// Publishes a grace-period confirmation for every order stuck in `Submitted`.
///
/// # Architecture Note
/// The manager owns its store and bus handles and holds no state between
/// cycles other than its [`ManagerState`]. All I/O is awaited sequentially:
/// one query, then one publish at a time in query order.
pub struct GracePeriodManager<S, B> {
    options: BackgroundTaskOptions,
    store: S,
    bus: B,
    observability: Arc<ObservabilityContext>,
    state: watch::Sender<ManagerState>,
}

impl<S: OrderStore, B: EventBus> GracePeriodManager<S, B> {
    pub fn new(
        options: BackgroundTaskOptions,
        store: S,
        bus: B,
        observability: Arc<ObservabilityContext>,
    ) -> Self {
        let (state, _) = watch::channel(ManagerState::Stopped);
        Self {
            options,
            store,
            bus,
            observability,
            state,
        }
    }

    pub fn state(&self) -> ManagerState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<ManagerState> {
        self.state.subscribe()
    }

    /// Runs poll cycles until `shutdown` is cancelled or a publish fails.
    ///
    /// # Returns
    ///
    /// - `Ok(RunSummary)` after cancellation
    /// - `Err(GracePeriodError::Publish)` when a publish call failed; the loop
    ///   does not retry, its supervisor decides whether to run it again
    pub async fn run(&self, shutdown: CancellationToken) -> Result<RunSummary, GracePeriodError> {
        let delay = self.options.check_update_time();
        debug!(
            check_update_secs = delay.as_secs_f64(),
            grace_period_secs = self.options.grace_period_time().as_secs(),
            "GracePeriodManager is starting"
        );

        let mut summary = RunSummary::default();
        let result = loop {
            if shutdown.is_cancelled() {
                break Ok(());
            }

            self.set_state(ManagerState::Running);
            debug!("GracePeriodManager background task is doing background work");
            match self.poll_once().await {
                Ok(report) => summary.absorb(&report),
                Err(e) => {
                    error!(order_id = %e.order_id, error = %e.source, "Publishing failed, stopping grace period loop");
                    break Err(GracePeriodError::from(e));
                }
            }

            self.set_state(ManagerState::Sleeping);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.cancelled() => {
                    debug!("GracePeriodManager background task received stop signal");
                    break Ok(());
                }
            }
        };

        self.set_state(ManagerState::Stopped);
        debug!(cycles = summary.cycles, events = summary.events_published, "GracePeriodManager background task is stopping");
        result.map(|()| summary)
    }

    /// Executes one cycle: query, then publish one event per order in order.
    ///
    /// Stops at the first publish failure; orders after it are not published
    /// this cycle. A query failure is not an error here (see
    /// [`find_grace_period_orders`](Self::find_grace_period_orders)).
    #[instrument(name = "check_confirmed_grace_period_orders", skip_all, fields(method = CHECK_ORDERS_METHOD))]
    pub async fn poll_once(&self) -> Result<CycleReport, PublishError> {
        let metrics = self.observability.metrics();
        metrics.record_cycle_started();
        let started = Instant::now();
        debug!("Checking confirmed grace period orders");

        let query = self.find_grace_period_orders().await;
        let outcome = if query.is_degraded() {
            CycleOutcome::QueryFailed
        } else {
            CycleOutcome::Completed
        };

        let mut published = Vec::new();
        for order_id in query.into_order_ids() {
            let event = GracePeriodConfirmedIntegrationEvent::new(order_id);
            info!(event_id = %event.id, %order_id, "Publishing integration event");

            if let Err(source) = self.publish(&event).await {
                metrics.record_duration(CHECK_ORDERS_METHOD, started.elapsed());
                metrics.record_cycle_outcome(CycleOutcome::PublishFailed);
                return Err(PublishError {
                    order_id,
                    event_id: event.id,
                    published_before: published,
                    source,
                });
            }
            published.push(order_id);
        }

        let elapsed = started.elapsed();
        metrics.record_duration(CHECK_ORDERS_METHOD, elapsed);
        metrics.record_cycle_outcome(outcome);
        debug!(published = published.len(), %outcome, elapsed_ms = elapsed.as_millis() as u64, "Grace period orders checked");

        Ok(CycleReport {
            published,
            outcome,
            elapsed,
        })
    }

    /// Looks up orders that are still `Submitted` after the grace period.
    ///
    /// Never fails: a store error is logged and returned as
    /// [`GracePeriodQuery::Degraded`], which reads as an empty result.
    #[instrument(name = "get_confirmed_grace_period_orders", skip_all, fields(method = GET_ORDERS_METHOD))]
    pub async fn find_grace_period_orders(&self) -> GracePeriodQuery {
        let started = Instant::now();
        let result = self
            .store
            .find_grace_period_orders(self.options.grace_period_time())
            .await;
        self.observability
            .metrics()
            .record_duration(GET_ORDERS_METHOD, started.elapsed());

        match result {
            Ok(ids) => {
                debug!(found = ids.len(), "Confirmed grace period orders retrieved");
                GracePeriodQuery::Found(ids)
            }
            Err(e) => {
                error!(error = %e, "Failed to retrieve confirmed grace period orders, skipping cycle");
                GracePeriodQuery::Degraded(e)
            }
        }
    }

    async fn publish(&self, event: &GracePeriodConfirmedIntegrationEvent) -> Result<(), EventBusError> {
        let envelope = EventEnvelope::from_event(event)?;
        self.bus.publish(envelope).await.inspect_err(|e| {
            warn!(event_id = %event.id, order_id = %event.order_id, error = %e, "Event bus rejected event");
        })
    }

    fn set_state(&self, state: ManagerState) {
        self.state.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::InMemoryEventBus;
    use crate::model::{OrderRecord, OrderStatus};
    use crate::store::InMemoryOrderStore;
    use crate::telemetry::InMemoryMetrics;
    use chrono::{Duration as ChronoDuration, Utc};

    fn options() -> BackgroundTaskOptions {
        BackgroundTaskOptions::new(Duration::from_millis(10), Duration::from_secs(30 * 60)).unwrap()
    }

    fn manager(
        store: InMemoryOrderStore,
        bus: InMemoryEventBus,
        metrics: Arc<InMemoryMetrics>,
    ) -> GracePeriodManager<InMemoryOrderStore, InMemoryEventBus> {
        GracePeriodManager::new(options(), store, bus, Arc::new(ObservabilityContext::new(metrics)))
    }

    #[tokio::test]
    async fn poll_once_publishes_each_stale_order() {
        let now = Utc::now();
        let store = InMemoryOrderStore::with_clock(move || now);
        store.insert(OrderRecord::new(1, now - ChronoDuration::minutes(40), OrderStatus::Submitted)).unwrap();
        store.insert(OrderRecord::new(4, now - ChronoDuration::minutes(31), OrderStatus::Submitted)).unwrap();
        let bus = InMemoryEventBus::default();
        let metrics = Arc::new(InMemoryMetrics::new());
        let manager = manager(store, bus.clone(), metrics.clone());

        let report = manager.poll_once().await.unwrap();

        assert_eq!(report.published, vec![OrderId(1), OrderId(4)]);
        assert_eq!(report.outcome, CycleOutcome::Completed);
        let published = bus.published();
        assert_eq!(published.len(), 2);
        assert!(published.iter().all(|e| e.event_type == "GracePeriodConfirmedIntegrationEvent"));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cycles_started, 1);
        assert_eq!(snapshot.outcome_count(CycleOutcome::Completed), 1);
        assert_eq!(snapshot.duration_count(CHECK_ORDERS_METHOD), 1);
        assert_eq!(snapshot.duration_count(GET_ORDERS_METHOD), 1);
    }

    #[tokio::test]
    async fn degraded_query_is_not_an_error() {
        let store = InMemoryOrderStore::new();
        store.set_unavailable(true).unwrap();
        let bus = InMemoryEventBus::default();
        let metrics = Arc::new(InMemoryMetrics::new());
        let manager = manager(store, bus.clone(), metrics.clone());

        let query = manager.find_grace_period_orders().await;
        assert!(query.is_degraded());

        let report = manager.poll_once().await.unwrap();
        assert!(report.published.is_empty());
        assert_eq!(report.outcome, CycleOutcome::QueryFailed);
        assert!(bus.published().is_empty());
        // Query duration is recorded on failure too.
        assert_eq!(metrics.snapshot().duration_count(GET_ORDERS_METHOD), 2);
    }

    #[tokio::test]
    async fn state_starts_stopped_and_returns_to_stopped() {
        let manager = manager(
            InMemoryOrderStore::new(),
            InMemoryEventBus::default(),
            Arc::new(InMemoryMetrics::new()),
        );
        assert_eq!(manager.state(), ManagerState::Stopped);

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let summary = manager.run(shutdown).await.unwrap();

        assert_eq!(summary, RunSummary::default());
        assert_eq!(manager.state(), ManagerState::Stopped);
    }
}
