//! # Order Processor
//!
//! > **Confirms orders whose grace period has elapsed.**
//!
//! The order processor is a single background service. On a fixed interval it
//! looks for orders that are still `Submitted` after a configured grace period
//! and publishes a `GracePeriodConfirmedIntegrationEvent` for each one, so the
//! ordering service can move them forward.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Loop ([`grace_period`])
//! - **Role**: Query, publish, sleep, repeat. Stops on cancellation or on the first failed publish.
//! - **Key items**: [`GracePeriodManager`](grace_period::GracePeriodManager), [`GracePeriodQuery`](grace_period::GracePeriodQuery).
//!
//! ### 2. The Collaborators ([`store`], [`event_bus`])
//! - **Role**: Where orders come from and where events go.
//! - **Key items**: [`OrderStore`](store::OrderStore), [`PostgresOrderStore`](store::PostgresOrderStore),
//!   [`EventBus`](event_bus::EventBus), [`InMemoryEventBus`](event_bus::InMemoryEventBus).
//!
//! ### 3. The Data ([`model`])
//! - **Key items**: [`OrderRecord`](model::OrderRecord), [`OrderStatus`](model::OrderStatus),
//!   [`GracePeriodConfirmedIntegrationEvent`](model::GracePeriodConfirmedIntegrationEvent).
//!
//! ### 4. The Runtime ([`lifecycle`], [`config`], [`telemetry`])
//! - **Role**: Spawning and stopping the loop, loading settings, logging and metrics.
//! - **Key items**: [`OrderProcessor`](lifecycle::OrderProcessor), [`ProcessorConfig`](config::ProcessorConfig),
//!   [`ObservabilityContext`](telemetry::ObservabilityContext).
//!
//! ## ⚠️ Delivery Semantics
//!
//! The loop keeps no memory between cycles. An order that stays `Submitted`
//! is published again on every cycle until another service changes its status.
//! Consumers must tolerate duplicates.
//!
//! ## 🚀 Running
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/orderingdb CHECK_UPDATE_TIME=30 GRACE_PERIOD_TIME=1 cargo run
//! ```
//!
//! ## 🧪 Testing
//!
//! See [`mock`] for scripted collaborators, and the in-memory store and bus
//! for scenario tests.

pub mod config;
pub mod event_bus;
pub mod grace_period;
pub mod lifecycle;
pub mod mock;
pub mod model;
pub mod store;
pub mod telemetry;
