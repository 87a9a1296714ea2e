//! Vehicle Telemetry Anomaly Detector
//!
//! Orchestrates the detection pipeline:
//! - Feature encoding and min-max scaling of each reading
//! - Next-reading forecast from the recent history window
//! - Composite features: raw values, prediction errors, rule indicators, rolling statistics
//! - Class-weighted anomaly classification
//!
//! `MonitoringSession` bundles a generator, a detector, and the annotated log
//! for one vehicle.

mod config;
mod detector;
mod error;
mod factory;
mod label;
mod session;

pub use config::DetectorConfig;
pub use detector::AnomalyDetector;
pub use error::DetectorError;
pub use factory::{DetectorFactory, DETECTOR_VERSION};
pub use label::{AnomalyLabel, Assessment};
pub use session::MonitoringSession;
