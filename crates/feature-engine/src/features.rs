//! Composite Feature Vector Assembly

use crate::statistics::RollingStatistics;
use crate::thresholds::{ThresholdConfig, RULE_INDICATOR_COUNT};
use data_validator::{SensorVector, FEATURE_NAMES, SENSOR_DIMENSION};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rolling block: mean, std, max, min, and deviation from mean per sensor
pub const ROLLING_BLOCK_DIMENSION: usize = 5 * SENSOR_DIMENSION;

/// Raw, predicted, signed/absolute/squared error, rules, rolling block
pub const COMPOSITE_DIMENSION: usize =
    5 * SENSOR_DIMENSION + RULE_INDICATOR_COUNT + ROLLING_BLOCK_DIMENSION;

/// Rolling block used while fewer than `rolling_window` history readings exist
pub const INSUFFICIENT_HISTORY_BLOCK: [f64; ROLLING_BLOCK_DIMENSION] = [0.0; ROLLING_BLOCK_DIMENSION];

const RAW_OFFSET: usize = 0;
const PREDICTED_OFFSET: usize = RAW_OFFSET + SENSOR_DIMENSION;
const SIGNED_ERROR_OFFSET: usize = PREDICTED_OFFSET + SENSOR_DIMENSION;
const ABS_ERROR_OFFSET: usize = SIGNED_ERROR_OFFSET + SENSOR_DIMENSION;
const SQUARED_ERROR_OFFSET: usize = ABS_ERROR_OFFSET + SENSOR_DIMENSION;
const RULES_OFFSET: usize = SQUARED_ERROR_OFFSET + SENSOR_DIMENSION;
const ROLLING_OFFSET: usize = RULES_OFFSET + RULE_INDICATOR_COUNT;

const RULE_NAMES: [&str; RULE_INDICATOR_COUNT] = [
    "temp_above_warning",
    "temp_above_critical",
    "vibration_above_warning",
    "vibration_above_critical",
    "battery_below_low",
    "battery_above_high",
    "rpm_above_high",
    "rpm_below_low",
    "temp_excess",
    "vibration_excess",
];

/// Fixed-length classifier input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFeatures {
    /// Values in composite order (`COMPOSITE_DIMENSION` entries)
    pub values: Vec<f64>,
    /// Whether the rolling block is the insufficient-history block
    pub insufficient_history: bool,
}

impl CompositeFeatures {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn raw(&self) -> &[f64] {
        &self.values[RAW_OFFSET..PREDICTED_OFFSET]
    }

    pub fn predicted(&self) -> &[f64] {
        &self.values[PREDICTED_OFFSET..SIGNED_ERROR_OFFSET]
    }

    pub fn signed_error(&self) -> &[f64] {
        &self.values[SIGNED_ERROR_OFFSET..ABS_ERROR_OFFSET]
    }

    pub fn rule_flags(&self) -> &[f64] {
        &self.values[RULES_OFFSET..ROLLING_OFFSET]
    }

    /// Whole rolling block (mean, std, max, min, deviation)
    pub fn rolling(&self) -> &[f64] {
        &self.values[ROLLING_OFFSET..COMPOSITE_DIMENSION]
    }

    pub fn rolling_mean(&self) -> &[f64] {
        &self.rolling()[..SENSOR_DIMENSION]
    }

    pub fn rolling_max(&self) -> &[f64] {
        &self.rolling()[2 * SENSOR_DIMENSION..3 * SENSOR_DIMENSION]
    }

    /// Human-readable name of every position
    pub fn feature_names() -> Vec<String> {
        let mut names = Vec::with_capacity(COMPOSITE_DIMENSION);
        for prefix in ["raw", "predicted", "error", "abs_error", "squared_error"] {
            names.extend(FEATURE_NAMES.iter().map(|f| format!("{prefix}_{f}")));
        }
        names.extend(RULE_NAMES.iter().map(|r| r.to_string()));
        for prefix in ["rolling_mean", "rolling_std", "rolling_max", "rolling_min", "deviation"] {
            names.extend(FEATURE_NAMES.iter().map(|f| format!("{prefix}_{f}")));
        }
        names
    }
}

/// Builds composite vectors from one reading and its context
#[derive(Debug, Clone)]
pub struct ClassificationFeatureBuilder {
    thresholds: ThresholdConfig,
    rolling_window: usize,
}

impl ClassificationFeatureBuilder {
    pub fn new(thresholds: ThresholdConfig, rolling_window: usize) -> Self {
        Self {
            thresholds,
            rolling_window: rolling_window.max(1),
        }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn rolling_window(&self) -> usize {
        self.rolling_window
    }

    /// Assemble the composite vector.
    ///
    /// `raw` is the unscaled current reading, `actual` and `predicted` are in
    /// scaled space, and `history` holds raw vectors of earlier readings,
    /// oldest first.
    pub fn build(
        &self,
        raw: &SensorVector,
        actual: &SensorVector,
        predicted: &SensorVector,
        history: &[SensorVector],
    ) -> CompositeFeatures {
        let mut values = Vec::with_capacity(COMPOSITE_DIMENSION);

        values.extend_from_slice(raw);
        values.extend_from_slice(predicted);

        let error: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();
        values.extend(error.iter().copied());
        values.extend(error.iter().map(|e| e.abs()));
        values.extend(error.iter().map(|e| e * e));

        values.extend_from_slice(&self.thresholds.indicators(raw));

        let insufficient_history = history.len() < self.rolling_window;
        if insufficient_history {
            values.extend_from_slice(&INSUFFICIENT_HISTORY_BLOCK);
        } else {
            let window = &history[history.len() - self.rolling_window..];
            let stats = RollingStatistics::compute(window);
            values.extend_from_slice(&stats.mean);
            values.extend_from_slice(&stats.std_dev);
            values.extend_from_slice(&stats.max);
            values.extend_from_slice(&stats.min);
            values.extend(raw.iter().zip(&stats.mean).map(|(r, m)| r - m));
        }

        debug!(
            "Built composite vector: history={} insufficient_history={}",
            history.len(),
            insufficient_history
        );

        CompositeFeatures {
            values,
            insufficient_history,
        }
    }
}

impl Default for ClassificationFeatureBuilder {
    fn default() -> Self {
        Self::new(ThresholdConfig::default(), 5)
    }
}
