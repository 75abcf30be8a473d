//! # Process Lifecycle
//!
//! [`OrderProcessor`] owns the background task running the
//! [`GracePeriodManager`](crate::grace_period::GracePeriodManager).
//!
//! ## Startup
//!
//! 1. Build the manager from options, store, bus and the observability context
//! 2. Spawn its run loop on a Tokio task with a fresh `CancellationToken`
//!
//! ## Shutdown
//!
//! - [`OrderProcessor::shutdown`] cancels the token and waits. A cycle in
//!   progress finishes; no new cycle starts, and a pending sleep is cut short.
//! - [`OrderProcessor::wait`] waits without cancelling. It returns when the
//!   token is cancelled elsewhere (see [`OrderProcessor::shutdown_token`]) or
//!   when the loop dies on a publish failure.
//!
//! ```rust,ignore
//! let processor = OrderProcessor::start(options, store, bus, observability);
//! // ...
//! let summary = processor.shutdown().await?;
//! ```

pub mod processor;

pub use processor::*;
