//! Vehicle Telemetry Monitor
//!
//! Trains one detection session off the async runtime, then streams readings
//! on a timer and logs every verdict.

mod settings;

pub use settings::MonitorSettings;

use anomaly_detector::MonitoringSession;
use anyhow::Context;
use data_validator::Validator;
use metrics_exporter_prometheus::PrometheusBuilder;
use ring_buffer::AnnotatedReading;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Counts gathered over one monitoring run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonitorSummary {
    pub ticks: u64,
    pub anomalies: u64,
    /// Lowest anomaly score seen (most anomalous)
    pub lowest_score: Option<f64>,
}

impl MonitorSummary {
    fn record(&mut self, annotated: &AnnotatedReading) {
        self.ticks += 1;
        if annotated.is_anomalous() {
            self.anomalies += 1;
        }
        let score = annotated.anomaly_score;
        self.lowest_score = Some(self.lowest_score.map_or(score, |s| s.min(score)));
    }

    pub fn anomaly_rate(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.anomalies as f64 / self.ticks as f64
        }
    }
}

/// Initialize logging
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder().with_env_filter(filter).with_target(true);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("Failed to set tracing subscriber")
}

/// Install the Prometheus exporter when an address is configured
pub fn init_metrics(listen: &str) -> anyhow::Result<()> {
    if listen.is_empty() {
        return Ok(());
    }
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid metrics listen address '{listen}'"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!("Prometheus metrics on http://{}/metrics", addr);
    Ok(())
}

/// Train a session, then stream readings until `max_ticks` or Ctrl-C
pub async fn run_monitor(settings: MonitorSettings) -> anyhow::Result<MonitorSummary> {
    let fault = settings.fault_kind()?;
    let detector = settings.detector_config()?;
    let mut session = MonitoringSession::new(settings.vehicle_id.clone(), detector)?;

    let samples = settings.training_samples;
    info!("Training detector for {} on {} samples...", settings.vehicle_id, samples);
    let mut session = tokio::task::spawn_blocking(move || session.train(samples).map(|_| session))
        .await
        .context("Training task panicked")??;
    info!("Detector ready, streaming every {} ms", settings.tick_interval_ms);

    session.inject_fault(fault);

    let validator = Validator::default();
    let mut summary = MonitorSummary::default();
    let mut ticker = tokio::time::interval(Duration::from_millis(settings.tick_interval_ms.max(1)));

    while settings.max_ticks == 0 || summary.ticks < settings.max_ticks {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping monitor");
                break;
            }
            _ = ticker.tick() => {}
        }

        let annotated = session.step()?;
        summary.record(&annotated);

        let sensors = annotated.reading.sensors();
        if annotated.is_anomalous() {
            let out_of_range = validator.validate_sensors(sensors);
            warn!(
                "ANOMALY {} score={:.3} rpm={} temp={} vib={} batt={} ({} fields out of range)",
                annotated.reading.timestamp(),
                annotated.anomaly_score,
                sensors.engine_rpm,
                sensors.engine_temp_c,
                sensors.vibration_level_g,
                sensors.battery_voltage_v,
                out_of_range.errors.len()
            );
        } else {
            debug!(
                "normal {} score={:.3}",
                annotated.reading.timestamp(),
                annotated.anomaly_score
            );
        }
    }

    info!(
        "Monitor finished: {} readings, {} anomalies ({:.1}%)",
        summary.ticks,
        summary.anomalies,
        summary.anomaly_rate() * 100.0
    );
    Ok(summary)
}
