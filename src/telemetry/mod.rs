//! Observability for the order processor.
//!
//! - [`setup_tracing`] initializes structured logging.
//! - [`setup_metrics`] installs the OpenTelemetry meter provider.
//! - [`ObservabilityContext`] carries the metrics recorder that the poller
//!   reports to. The binary uses [`OtelMetrics`]; tests swap in
//!   [`InMemoryMetrics`] or [`NoopMetrics`].

pub mod metrics;
pub mod otel;
pub mod tracing;

pub use self::metrics::*;
pub use self::otel::*;
pub use self::tracing::*;
