//! Monitor settings

use anomaly_detector::DetectorConfig;
use anyhow::Context;
use feature_engine::ThresholdConfig;
use serde::{Deserialize, Serialize};
use vehicle_sim::{FaultError, FaultKind, DEFAULT_VEHICLE_ID};

/// Runtime settings for the monitoring loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Vehicle identifier stamped on generated readings
    pub vehicle_id: String,

    /// Normal readings synthesised for training
    pub training_samples: usize,

    /// Delay between readings
    pub tick_interval_ms: u64,

    /// Stop after this many readings (0 runs until interrupted)
    pub max_ticks: u64,

    /// Fault tag injected once streaming starts ("none" for a healthy run)
    pub fault: String,

    /// Emit JSON log lines
    pub log_json: bool,

    /// Prometheus exporter address; empty disables the exporter
    pub metrics_listen: String,

    /// Threshold preset replacing `detector.thresholds` (`default`, `strict`,
    /// `lenient`); empty keeps the configured thresholds
    pub threshold_preset: String,

    pub detector: DetectorConfig,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            vehicle_id: DEFAULT_VEHICLE_ID.to_string(),
            training_samples: 500,
            tick_interval_ms: 1000,
            max_ticks: 0,
            fault: "none".to_string(),
            log_json: false,
            metrics_listen: String::new(),
            threshold_preset: String::new(),
            detector: DetectorConfig::default(),
        }
    }
}

impl MonitorSettings {
    /// Load settings: defaults, then the optional file, then `MONITOR_*` variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&MonitorSettings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // MONITOR_DETECTOR__SEQUENCE_LENGTH=12 sets detector.sequence_length
        builder = builder.add_source(
            config::Environment::with_prefix("MONITOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Parsed fault tag
    pub fn fault_kind(&self) -> Result<Option<FaultKind>, FaultError> {
        FaultKind::parse_optional(&self.fault)
    }

    /// Detector configuration with the threshold preset applied
    pub fn detector_config(&self) -> anyhow::Result<DetectorConfig> {
        let mut detector = self.detector.clone();
        if !self.threshold_preset.trim().is_empty() {
            detector.thresholds = ThresholdConfig::preset(&self.threshold_preset).with_context(|| {
                format!(
                    "Unknown threshold preset '{}'. Expected one of: default, strict, lenient",
                    self.threshold_preset
                )
            })?;
        }
        Ok(detector)
    }

    /// Run a fixed number of readings as fast as possible
    pub fn bounded(max_ticks: u64) -> Self {
        Self {
            tick_interval_ms: 1,
            max_ticks,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = MonitorSettings::default();
        assert_eq!(settings.vehicle_id, "HERO-MNM-01");
        assert_eq!(settings.training_samples, 500);
        assert_eq!(settings.fault_kind(), Ok(None));
        assert_eq!(settings.detector.sequence_length, 10);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("monitor-settings-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "vehicle_id = \"FLEET-7\"\nfault = \"overheat\"\n\n[detector]\nsequence_length = 8\n"
        )
        .unwrap();

        let settings = MonitorSettings::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.vehicle_id, "FLEET-7");
        assert_eq!(settings.fault_kind(), Ok(Some(FaultKind::Overheat)));
        assert_eq!(settings.detector.sequence_length, 8);
        assert_eq!(settings.detector.history_capacity, 50);
        assert_eq!(settings.tick_interval_ms, 1000);
    }

    #[test]
    fn test_missing_file_is_optional() {
        let settings = MonitorSettings::load(Some("/nonexistent/monitor")).unwrap();
        assert_eq!(settings.training_samples, 500);
    }

    #[test]
    fn test_threshold_preset_replaces_thresholds() {
        let mut settings = MonitorSettings::default();
        settings.detector.thresholds.temp_warning_c = 101.0;
        assert_eq!(settings.detector_config().unwrap().thresholds.temp_warning_c, 101.0);

        settings.threshold_preset = "lenient".into();
        assert_eq!(
            settings.detector_config().unwrap().thresholds,
            ThresholdConfig::lenient()
        );

        settings.threshold_preset = "paranoid".into();
        assert!(settings.detector_config().is_err());
    }

    #[test]
    fn test_unknown_fault_tag() {
        let settings = MonitorSettings {
            fault: "flat_tyre".into(),
            ..Default::default()
        };
        assert!(settings.fault_kind().is_err());
    }
}
