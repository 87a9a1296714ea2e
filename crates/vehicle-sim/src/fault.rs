//! Synthetic Fault Modes

use rand::Rng;
use ring_buffer::SensorBlock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by fault selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultError {
    /// Tag is not one of the recognised fault names
    #[error("Unknown fault type: {0}. Expected one of: none, overheat, vibration, battery_failure, throttle_malfunction, engine_misfire, fuel_system, cooling_system")]
    InvalidFault(String),
}

/// Named synthetic failure mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Critical coolant temperature
    Overheat,
    /// Mechanical looseness
    Vibration,
    /// Charging system collapse
    BatteryFailure,
    /// High rpm with a closed throttle
    ThrottleMalfunction,
    /// Low rpm with rough running
    EngineMisfire,
    /// Low rpm despite an open throttle
    FuelSystem,
    /// Elevated but sub-critical temperature
    CoolingSystem,
}

impl FaultKind {
    /// Every fault, in training order
    pub const ALL: [FaultKind; 7] = [
        FaultKind::Overheat,
        FaultKind::Vibration,
        FaultKind::BatteryFailure,
        FaultKind::ThrottleMalfunction,
        FaultKind::EngineMisfire,
        FaultKind::FuelSystem,
        FaultKind::CoolingSystem,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Overheat => "overheat",
            FaultKind::Vibration => "vibration",
            FaultKind::BatteryFailure => "battery_failure",
            FaultKind::ThrottleMalfunction => "throttle_malfunction",
            FaultKind::EngineMisfire => "engine_misfire",
            FaultKind::FuelSystem => "fuel_system",
            FaultKind::CoolingSystem => "cooling_system",
        }
    }

    /// Parse an optional tag where `"none"` (or an empty string) clears the fault
    pub fn parse_optional(tag: &str) -> Result<Option<FaultKind>, FaultError> {
        match tag.trim() {
            "" | "none" => Ok(None),
            other => other.parse().map(Some),
        }
    }

    /// Output override ranges for this fault
    pub fn profile(&self) -> FaultProfile {
        let base = FaultProfile::default();
        match self {
            FaultKind::Overheat => FaultProfile {
                engine_temp_c: Some((120.0, 140.0)),
                ..base
            },
            FaultKind::Vibration => FaultProfile {
                vibration_level_g: Some((1.5, 2.5)),
                ..base
            },
            FaultKind::BatteryFailure => FaultProfile {
                battery_voltage_v: Some((10.5, 11.5)),
                ..base
            },
            FaultKind::ThrottleMalfunction => FaultProfile {
                engine_rpm: Some((3600.0, 4500.0)),
                throttle_pos_pct: Some((0.0, 15.0)),
                ..base
            },
            FaultKind::EngineMisfire => FaultProfile {
                engine_rpm: Some((600.0, 1100.0)),
                vibration_level_g: Some((0.6, 1.0)),
                ..base
            },
            FaultKind::FuelSystem => FaultProfile {
                engine_rpm: Some((550.0, 740.0)),
                throttle_pos_pct: Some((45.0, 90.0)),
                ..base
            },
            FaultKind::CoolingSystem => FaultProfile {
                engine_temp_c: Some((110.0, 120.0)),
                ..base
            },
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultKind {
    type Err = FaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaultKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FaultError::InvalidFault(s.to_string()))
    }
}

/// Uniform override range per published quantity, `None` leaves it untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultProfile {
    pub engine_rpm: Option<(f64, f64)>,
    pub engine_temp_c: Option<(f64, f64)>,
    pub vibration_level_g: Option<(f64, f64)>,
    pub throttle_pos_pct: Option<(f64, f64)>,
    pub battery_voltage_v: Option<(f64, f64)>,
}

impl FaultProfile {
    /// Overwrite the targeted quantities of a published sensor block
    pub fn apply<R: Rng>(&self, sensors: &mut SensorBlock, rng: &mut R) {
        if let Some(range) = self.engine_rpm {
            sensors.engine_rpm = draw(rng, range);
        }
        if let Some(range) = self.engine_temp_c {
            sensors.engine_temp_c = draw(rng, range);
        }
        if let Some(range) = self.vibration_level_g {
            sensors.vibration_level_g = draw(rng, range);
        }
        if let Some(range) = self.throttle_pos_pct {
            sensors.throttle_pos_pct = draw(rng, range).round().clamp(0.0, 100.0) as u8;
        }
        if let Some(range) = self.battery_voltage_v {
            sensors.battery_voltage_v = draw(rng, range);
        }
    }
}

fn draw<R: Rng>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}
