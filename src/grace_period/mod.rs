//! # Grace Period Manager
//!
//! The background poller that confirms orders once their grace period is over.
//!
//! Every `check_update_time` the [`GracePeriodManager`] asks the
//! [`OrderStore`](crate::store::OrderStore) for orders that are still
//! `Submitted` after `grace_period_time`, and publishes one
//! [`GracePeriodConfirmedIntegrationEvent`](crate::model::GracePeriodConfirmedIntegrationEvent)
//! per order on the [`EventBus`](crate::event_bus::EventBus).
//!
//! ## Failure handling
//!
//! The two collaborators fail differently, and the types say so:
//!
//! - A failed query becomes [`GracePeriodQuery::Degraded`]. It is logged, the
//!   cycle publishes nothing, and the loop sleeps and tries again.
//! - A failed publish becomes a [`PublishError`]. It ends the cycle at that
//!   order and ends [`GracePeriodManager::run`] with
//!   [`GracePeriodError::Publish`], leaving restarts to the supervisor.
//!
//! ## No cross-cycle state
//!
//! Cycles do not remember what they published. An order that stays
//! `Submitted` gets a fresh event on every cycle until its status changes.

pub mod error;
pub mod manager;
pub mod query;

pub use error::*;
pub use manager::*;
pub use query::*;
