use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::BackgroundTaskOptions;
use crate::event_bus::EventBus;
use crate::grace_period::{GracePeriodError, GracePeriodManager, ManagerState, RunSummary};
use crate::store::OrderStore;
use crate::telemetry::ObservabilityContext;

/// Ways the processor can end other than a clean cancellation.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Loop(#[from] GracePeriodError),
    #[error("Grace period task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// The running order processor: one grace-period loop on a background task.
pub struct OrderProcessor {
    shutdown: CancellationToken,
    state: watch::Receiver<ManagerState>,
    handle: JoinHandle<Result<RunSummary, GracePeriodError>>,
}

impl OrderProcessor {
    /// Spawns the grace-period loop. Must be called inside a Tokio runtime.
    pub fn start<S, B>(
        options: BackgroundTaskOptions,
        store: S,
        bus: B,
        observability: Arc<ObservabilityContext>,
    ) -> Self
    where
        S: OrderStore + 'static,
        B: EventBus + 'static,
    {
        info!(
            service = observability.service_name,
            version = observability.service_version,
            "Starting order processor"
        );
        let manager = GracePeriodManager::new(options, store, bus, observability);
        let state = manager.subscribe_state();
        let shutdown = CancellationToken::new();

        let token = shutdown.clone();
        let handle = tokio::spawn(async move { manager.run(token).await });

        Self {
            shutdown,
            state,
            handle,
        }
    }

    /// Token that stops the loop when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Receiver for the loop's state transitions.
    pub fn state(&self) -> watch::Receiver<ManagerState> {
        self.state.clone()
    }

    /// Cancels the loop and waits for it to stop.
    pub async fn shutdown(self) -> Result<RunSummary, ProcessorError> {
        info!("Shutting down order processor...");
        self.shutdown.cancel();
        self.wait().await
    }

    /// Waits for the loop to stop without cancelling it.
    pub async fn wait(self) -> Result<RunSummary, ProcessorError> {
        match self.handle.await {
            Ok(Ok(summary)) => {
                info!(
                    cycles = summary.cycles,
                    events = summary.events_published,
                    degraded = summary.degraded_cycles,
                    "Order processor stopped"
                );
                Ok(summary)
            }
            Ok(Err(e)) => {
                error!(error = %e, "Order processor loop failed");
                Err(e.into())
            }
            Err(e) => {
                error!(error = %e, "Order processor task failed");
                Err(e.into())
            }
        }
    }
}
