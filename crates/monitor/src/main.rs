//! Vehicle Telemetry Monitor - Main Entry Point

use monitor::{init_logging, init_metrics, run_monitor, MonitorSettings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let settings = MonitorSettings::load(config_path.as_deref())?;

    init_logging(settings.log_json)?;
    init_metrics(&settings.metrics_listen)?;

    info!("=== Vehicle Telemetry Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Vehicle {} (fault: {})", settings.vehicle_id, settings.fault);

    run_monitor(settings).await?;
    Ok(())
}
