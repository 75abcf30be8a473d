//! # Metrics
//!
//! Counters and duration measurements exposed by the grace-period poller.
//! They are informational only: nothing in the loop reads them back. The
//! process exports them through [`OtelMetrics`](super::OtelMetrics).
//!
//! | Instrument | Meaning |
//! |------------|---------|
//! | `check_orders_requests` | cycles started |
//! | `grace_period_cycles` | cycles by [`CycleOutcome`] |
//! | `request_duration` (ms) | tagged with a `method`, one of [`CHECK_ORDERS_METHOD`] or [`GET_ORDERS_METHOD`] |

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Service name reported with every measurement.
pub const SERVICE_NAME: &str = "OrderProcessor";
/// Service version reported with every measurement.
pub const SERVICE_VERSION: &str = "1.0.0";

/// `method` tag for a whole poll cycle.
pub const CHECK_ORDERS_METHOD: &str = "CheckConfirmedGracePeriodOrders";
/// `method` tag for the order store query.
pub const GET_ORDERS_METHOD: &str = "GetConfirmedGracePeriodOrders";

/// How a poll cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleOutcome {
    /// Query succeeded and every event was published.
    Completed,
    /// Query failed and the cycle was treated as finding no orders.
    QueryFailed,
    /// A publish call failed; the loop stops.
    PublishFailed,
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Completed => write!(f, "completed"),
            CycleOutcome::QueryFailed => write!(f, "query_failed"),
            CycleOutcome::PublishFailed => write!(f, "publish_failed"),
        }
    }
}

/// Sink for poller measurements.
pub trait MetricsRecorder: Send + Sync {
    /// A cycle has started (`check_orders_requests`).
    fn record_cycle_started(&self);

    /// A cycle has ended with `outcome`.
    fn record_cycle_outcome(&self, outcome: CycleOutcome);

    /// Elapsed time of the operation tagged `method`.
    fn record_duration(&self, method: &'static str, elapsed: Duration);
}

/// Discards every measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn record_cycle_started(&self) {}

    fn record_cycle_outcome(&self, _outcome: CycleOutcome) {}

    fn record_duration(&self, _method: &'static str, _elapsed: Duration) {}
}

/// Keeps measurements in memory so tests can inspect them.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    cycles_started: AtomicU64,
    outcomes: Mutex<HashMap<CycleOutcome, u64>>,
    durations: Mutex<Vec<(&'static str, Duration)>>,
}

/// Point-in-time copy of [`InMemoryMetrics`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub cycles_started: u64,
    pub outcomes: HashMap<CycleOutcome, u64>,
    pub durations: Vec<(&'static str, Duration)>,
}

impl MetricsSnapshot {
    pub fn outcome_count(&self, outcome: CycleOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn duration_count(&self, method: &str) -> usize {
        self.durations.iter().filter(|(m, _)| *m == method).count()
    }
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_started: self.cycles_started.load(Ordering::SeqCst),
            outcomes: lock(&self.outcomes).clone(),
            durations: lock(&self.durations).clone(),
        }
    }
}

impl MetricsRecorder for InMemoryMetrics {
    fn record_cycle_started(&self) {
        self.cycles_started.fetch_add(1, Ordering::SeqCst);
    }

    fn record_cycle_outcome(&self, outcome: CycleOutcome) {
        *lock(&self.outcomes).entry(outcome).or_insert(0) += 1;
    }

    fn record_duration(&self, method: &'static str, elapsed: Duration) {
        lock(&self.durations).push((method, elapsed));
    }
}

// Metrics must never take the loop down, so a poisoned lock is still used.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Observability handles for one process, built once at startup.
#[derive(Clone)]
pub struct ObservabilityContext {
    pub service_name: &'static str,
    pub service_version: &'static str,
    metrics: Arc<dyn MetricsRecorder>,
}

impl ObservabilityContext {
    pub fn new(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            service_name: SERVICE_NAME,
            service_version: SERVICE_VERSION,
            metrics,
        }
    }

    /// A context that records nothing.
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopMetrics))
    }

    pub fn metrics(&self) -> &dyn MetricsRecorder {
        self.metrics.as_ref()
    }
}

impl fmt::Debug for ObservabilityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservabilityContext")
            .field("service_name", &self.service_name)
            .field("service_version", &self.service_version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_metrics_accumulate() {
        let metrics = InMemoryMetrics::new();
        metrics.record_cycle_started();
        metrics.record_cycle_started();
        metrics.record_cycle_outcome(CycleOutcome::Completed);
        metrics.record_cycle_outcome(CycleOutcome::QueryFailed);
        metrics.record_cycle_outcome(CycleOutcome::Completed);
        metrics.record_duration(GET_ORDERS_METHOD, Duration::from_millis(3));
        metrics.record_duration(CHECK_ORDERS_METHOD, Duration::from_millis(5));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cycles_started, 2);
        assert_eq!(snapshot.outcome_count(CycleOutcome::Completed), 2);
        assert_eq!(snapshot.outcome_count(CycleOutcome::QueryFailed), 1);
        assert_eq!(snapshot.outcome_count(CycleOutcome::PublishFailed), 0);
        assert_eq!(snapshot.duration_count(GET_ORDERS_METHOD), 1);
        assert_eq!(snapshot.duration_count(CHECK_ORDERS_METHOD), 1);
    }

    #[test]
    fn context_forwards_to_recorder() {
        let metrics = Arc::new(InMemoryMetrics::new());
        let context = ObservabilityContext::new(metrics.clone());
        context.metrics().record_cycle_started();

        assert_eq!(metrics.snapshot().cycles_started, 1);
        assert_eq!(context.service_name, "OrderProcessor");
        assert_eq!(context.service_version, "1.0.0");
    }
}
