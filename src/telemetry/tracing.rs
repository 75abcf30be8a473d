//! # Logging & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! Verbosity is controlled by `RUST_LOG`. When it is unset the processor logs
//! at `info` for its own crate and `warn` for everything else (sqlx included).
//!
//! ```bash
//! # Default: one line per published event
//! cargo run
//!
//! # Cycle start/stop and query results
//! RUST_LOG=order_processor=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Loop lifecycle**: start, cancellation, stop, fatal errors
//! - **Cycles**: each cycle runs in a `check_confirmed_grace_period_orders` span
//! - **Queries**: each query runs in a nested `get_confirmed_grace_period_orders` span
//! - **Events**: one `info` line per published event with its id and order id
//!
//! ```text
//! DEBUG check_confirmed_grace_period_orders: Checking confirmed grace period orders method="CheckConfirmedGracePeriodOrders"
//! INFO check_confirmed_grace_period_orders: Publishing integration event event_id=5b0c... order_id=1
//! ```

const DEFAULT_FILTER: &str = "warn,order_processor=info";

/// Initializes the global tracing subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
