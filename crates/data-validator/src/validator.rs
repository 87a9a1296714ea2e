//! Physiological Range Checking

use crate::error::ValidationError;
use ring_buffer::SensorBlock;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Documented healthy ranges for each sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRanges {
    /// RPM valid range
    pub rpm_range: (f64, f64),
    /// Coolant temp valid range (°C)
    pub temp_range: (f64, f64),
    /// Vibration valid range (g)
    pub vibration_range: (f64, f64),
    /// Throttle valid range (%)
    pub throttle_range: (f64, f64),
    /// Battery valid range (V)
    pub battery_range: (f64, f64),
}

impl Default for SensorRanges {
    fn default() -> Self {
        Self {
            rpm_range: (750.0, 3500.0),
            temp_range: (70.0, 105.0),
            vibration_range: (0.05, 0.40),
            throttle_range: (0.0, 100.0),
            battery_range: (13.2, 14.8),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }
}

/// Range validator for sensor blocks
pub struct Validator {
    ranges: SensorRanges,
}

impl Validator {
    /// Create a new validator with given ranges
    pub fn new(ranges: SensorRanges) -> Self {
        Self { ranges }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    pub fn validate_rpm(&self, rpm: f64) -> Result<(), ValidationError> {
        self.validate_range("engine_rpm", rpm, self.ranges.rpm_range)
    }

    pub fn validate_temp(&self, temp: f64) -> Result<(), ValidationError> {
        self.validate_range("engine_temp_c", temp, self.ranges.temp_range)
    }

    pub fn validate_vibration(&self, vibration: f64) -> Result<(), ValidationError> {
        self.validate_range("vibration_level_g", vibration, self.ranges.vibration_range)
    }

    pub fn validate_throttle(&self, throttle: f64) -> Result<(), ValidationError> {
        self.validate_range("throttle_pos_pct", throttle, self.ranges.throttle_range)
    }

    pub fn validate_battery(&self, battery: f64) -> Result<(), ValidationError> {
        self.validate_range("battery_voltage_v", battery, self.ranges.battery_range)
    }

    /// Check every sensor, collecting all violations
    pub fn validate_sensors(&self, sensors: &SensorBlock) -> ValidationResult {
        let checks = [
            self.validate_rpm(sensors.engine_rpm),
            self.validate_temp(sensors.engine_temp_c),
            self.validate_vibration(sensors.vibration_level_g),
            self.validate_throttle(f64::from(sensors.throttle_pos_pct)),
            self.validate_battery(sensors.battery_voltage_v),
        ];
        let fields_checked = checks.len();
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();

        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            for error in &errors {
                warn!("Sensor outside healthy range: {}", error);
            }
            ValidationResult::invalid(errors, fields_checked)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(SensorRanges::default())
    }
}
