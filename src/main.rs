use std::sync::Arc;

use order_processor::config::ProcessorConfig;
use order_processor::event_bus::LogEventBus;
use order_processor::lifecycle::OrderProcessor;
use order_processor::store::PostgresOrderStore;
use order_processor::telemetry::{setup_metrics, setup_tracing, ObservabilityContext, OtelMetrics};
use tracing::{error, info};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();
    setup_tracing();
    let meter_provider = setup_metrics();

    let config = ProcessorConfig::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    info!(
        check_update_secs = config.options.check_update_time().as_secs(),
        grace_period_mins = config.options.grace_period_time().as_secs() / 60,
        "Configuration loaded"
    );

    // Lazy pool: an unreachable database degrades cycles instead of failing startup.
    let pool = PostgresOrderStore::pool()
        .max_connections(config.database_max_connections)
        .connect_lazy(&config.database_url)?;
    let store = PostgresOrderStore::new(pool);

    let observability = Arc::new(ObservabilityContext::new(Arc::new(OtelMetrics::new())));
    let processor = OrderProcessor::start(config.options, store, LogEventBus, observability);

    let shutdown = processor.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            shutdown.cancel();
        }
    });

    let result = processor.wait().await;
    if let Err(e) = meter_provider.shutdown() {
        error!(error = %e, "Failed to flush metrics");
    }
    result?;
    info!("Application completed successfully");
    Ok(())
}
