//! Rule-Based Threshold Indicators

use data_validator::SensorVector;
use serde::{Deserialize, Serialize};

/// Number of rule-based indicators in the composite vector
pub const RULE_INDICATOR_COUNT: usize = 10;

/// Fixed domain thresholds behind the rule indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Elevated coolant temperature (°C)
    pub temp_warning_c: f64,
    /// Critical coolant temperature (°C)
    pub temp_critical_c: f64,
    /// Elevated vibration (g)
    pub vibration_warning_g: f64,
    /// Critical vibration (g)
    pub vibration_critical_g: f64,
    /// Undercharging battery (V)
    pub battery_low_v: f64,
    /// Overcharging battery (V)
    pub battery_high_v: f64,
    /// High engine speed
    pub rpm_high: f64,
    /// Low engine speed
    pub rpm_low: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_warning_c: 105.0,
            temp_critical_c: 120.0,
            vibration_warning_g: 0.4,
            vibration_critical_g: 1.0,
            battery_low_v: 13.5,
            battery_high_v: 14.5,
            rpm_high: 3000.0,
            rpm_low: 800.0,
        }
    }
}

impl ThresholdConfig {
    /// Create strict config (earlier warnings)
    pub fn strict() -> Self {
        Self {
            temp_warning_c: 100.0,
            vibration_warning_g: 0.35,
            battery_low_v: 13.6,
            ..Default::default()
        }
    }

    /// Create lenient config (later warnings)
    pub fn lenient() -> Self {
        Self {
            temp_warning_c: 110.0,
            vibration_warning_g: 0.5,
            battery_low_v: 13.3,
            ..Default::default()
        }
    }

    /// Named preset: `default`, `strict` or `lenient`
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim() {
            "default" => Some(Self::default()),
            "strict" => Some(Self::strict()),
            "lenient" => Some(Self::lenient()),
            _ => None,
        }
    }

    /// Ten indicators over a raw vector, in composite order
    pub fn indicators(&self, raw: &SensorVector) -> [f64; RULE_INDICATOR_COUNT] {
        let [rpm, temp, vibration, _throttle, battery] = *raw;
        let flag = |condition: bool| if condition { 1.0 } else { 0.0 };

        [
            flag(temp > self.temp_warning_c),
            flag(temp > self.temp_critical_c),
            flag(vibration > self.vibration_warning_g),
            flag(vibration > self.vibration_critical_g),
            flag(battery < self.battery_low_v),
            flag(battery > self.battery_high_v),
            flag(rpm > self.rpm_high),
            flag(rpm < self.rpm_low),
            (temp - self.temp_warning_c).max(0.0),
            (vibration - self.vibration_warning_g).max(0.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_reading_raises_nothing() {
        let flags = ThresholdConfig::default().indicators(&[2000.0, 90.0, 0.25, 30.0, 14.0]);
        assert!(flags.iter().all(|&f| f == 0.0));
    }

    #[test]
    fn test_overheat_and_excess() {
        let flags = ThresholdConfig::default().indicators(&[2000.0, 125.0, 0.25, 30.0, 14.0]);
        assert_eq!(flags[0], 1.0);
        assert_eq!(flags[1], 1.0);
        assert!((flags[8] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_vibration_battery_rpm_flags() {
        let flags = ThresholdConfig::default().indicators(&[700.0, 90.0, 1.6, 30.0, 11.0]);
        assert_eq!(&flags[2..5], &[1.0, 1.0, 1.0]);
        assert_eq!(flags[5], 0.0);
        assert_eq!(flags[6], 0.0);
        assert_eq!(flags[7], 1.0);
        assert!((flags[9] - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(ThresholdConfig::preset("strict"), Some(ThresholdConfig::strict()));
        assert_eq!(ThresholdConfig::preset(" lenient"), Some(ThresholdConfig::lenient()));
        assert_eq!(ThresholdConfig::preset("default"), Some(ThresholdConfig::default()));
        assert_eq!(ThresholdConfig::preset("paranoid"), None);
    }

    #[test]
    fn test_strict_warns_earlier() {
        let raw = [2000.0, 102.0, 0.25, 30.0, 14.0];
        assert_eq!(ThresholdConfig::default().indicators(&raw)[0], 0.0);
        assert_eq!(ThresholdConfig::strict().indicators(&raw)[0], 1.0);
        assert_eq!(ThresholdConfig::lenient().indicators(&raw)[0], 0.0);
    }
}
