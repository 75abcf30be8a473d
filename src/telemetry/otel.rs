//! OpenTelemetry-backed metrics for the running process.
//!
//! [`setup_metrics`] installs a global `SdkMeterProvider` with a periodic
//! stdout exporter; [`OtelMetrics`] records onto meters from that provider.
//! The instruments are:
//!
//! - `check_orders_requests`: counter, one per cycle started
//! - `grace_period_cycles`: counter tagged with `outcome`
//! - `request_duration`: histogram in milliseconds tagged with `method`

use std::time::Duration;

use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{global, InstrumentationScope, KeyValue};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::Resource;

use super::metrics::{CycleOutcome, MetricsRecorder, SERVICE_NAME, SERVICE_VERSION};

/// Builds the meter provider, registers it globally and returns it so the
/// caller can flush it on shutdown.
pub fn setup_metrics() -> SdkMeterProvider {
    let resource = Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_attribute(KeyValue::new("service.version", SERVICE_VERSION))
        .build();
    let provider = SdkMeterProvider::builder()
        .with_periodic_exporter(opentelemetry_stdout::MetricExporter::default())
        .with_resource(resource)
        .build();
    global::set_meter_provider(provider.clone());
    provider
}

/// [`MetricsRecorder`] over OpenTelemetry instruments.
#[derive(Clone)]
pub struct OtelMetrics {
    check_orders_requests: Counter<u64>,
    cycle_outcomes: Counter<u64>,
    request_duration: Histogram<f64>,
}

impl OtelMetrics {
    /// Instruments from the global meter provider, scoped to this service.
    pub fn new() -> Self {
        let scope = InstrumentationScope::builder(SERVICE_NAME)
            .with_version(SERVICE_VERSION)
            .build();
        Self::from_meter(&global::meter_with_scope(scope))
    }

    pub fn from_meter(meter: &Meter) -> Self {
        Self {
            check_orders_requests: meter
                .u64_counter("check_orders_requests")
                .with_description("Grace period check cycles started")
                .build(),
            cycle_outcomes: meter
                .u64_counter("grace_period_cycles")
                .with_description("Grace period check cycles by outcome")
                .build(),
            request_duration: meter
                .f64_histogram("request_duration")
                .with_unit("ms")
                .with_description("Duration of grace period operations")
                .build(),
        }
    }
}

impl Default for OtelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for OtelMetrics {
    fn record_cycle_started(&self) {
        self.check_orders_requests.add(1, &[]);
    }

    fn record_cycle_outcome(&self, outcome: CycleOutcome) {
        self.cycle_outcomes
            .add(1, &[KeyValue::new("outcome", outcome.to_string())]);
    }

    fn record_duration(&self, method: &'static str, elapsed: Duration) {
        self.request_duration
            .record(elapsed.as_secs_f64() * 1000.0, &[KeyValue::new("method", method)]);
    }
}
