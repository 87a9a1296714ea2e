//! Vehicle Telemetry Reading

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Five-sensor block carried by every reading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorBlock {
    /// Engine speed (rev/min)
    pub engine_rpm: f64,
    /// Coolant temperature (°C)
    pub engine_temp_c: f64,
    /// Chassis vibration (g)
    pub vibration_level_g: f64,
    /// Throttle position (%)
    pub throttle_pos_pct: u8,
    /// Battery voltage (V)
    pub battery_voltage_v: f64,
}

/// One timestamped sensor sample from a vehicle.
///
/// Readings are immutable once created. The `id` is the instance identity
/// used by the detector history to recognise a reading it has already seen;
/// two readings with identical sensor values are still distinct instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    vehicle_id: String,
    timestamp: DateTime<Utc>,
    sensors: SensorBlock,
}

impl Reading {
    /// Create a reading stamped with the current time
    pub fn new(vehicle_id: impl Into<String>, sensors: SensorBlock) -> Self {
        Self::with_timestamp(vehicle_id, Utc::now(), sensors)
    }

    /// Create a reading with an explicit timestamp
    pub fn with_timestamp(
        vehicle_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        sensors: SensorBlock,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id: vehicle_id.into(),
            timestamp,
            sensors,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn sensors(&self) -> &SensorBlock {
        &self.sensors
    }

    /// Whether both values are the same reading instance
    pub fn same_instance(&self, other: &Reading) -> bool {
        self.id == other.id
    }
}

/// Reading annotated by a caller with the detector's verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedReading {
    #[serde(flatten)]
    pub reading: Reading,
    /// -1 anomalous, 1 normal
    pub anomaly: i8,
    /// Lower is more anomalous
    pub anomaly_score: f64,
}

impl AnnotatedReading {
    pub fn is_anomalous(&self) -> bool {
        self.anomaly < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> SensorBlock {
        SensorBlock {
            engine_rpm: 2000.0,
            engine_temp_c: 90.0,
            vibration_level_g: 0.25,
            throttle_pos_pct: 30,
            battery_voltage_v: 14.0,
        }
    }

    #[test]
    fn test_instances_are_distinct() {
        let a = Reading::new("HERO-MNM-01", sample_block());
        let b = Reading::new("HERO-MNM-01", sample_block());
        assert_eq!(a.sensors(), b.sensors());
        assert!(!a.same_instance(&b));
        assert!(a.same_instance(&a.clone()));
    }

    #[test]
    fn test_json_shape() {
        let reading = Reading::new("HERO-MNM-01", sample_block());
        let value = serde_json::to_value(&reading).unwrap();
        assert_eq!(value["vehicle_id"], "HERO-MNM-01");
        assert_eq!(value["sensors"]["throttle_pos_pct"], 30);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_missing_id_gets_fresh_identity() {
        let json = r#"{
            "vehicle_id": "V1",
            "timestamp": "2024-05-01T10:00:00Z",
            "sensors": {
                "engine_rpm": 1500.0,
                "engine_temp_c": 88.0,
                "vibration_level_g": 0.2,
                "throttle_pos_pct": 20,
                "battery_voltage_v": 13.9
            }
        }"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.vehicle_id(), "V1");
        assert!(!reading.id().is_nil());
    }

    #[test]
    fn test_annotation_flattens_reading() {
        let annotated = AnnotatedReading {
            reading: Reading::new("V1", sample_block()),
            anomaly: -1,
            anomaly_score: -0.93,
        };
        let value = serde_json::to_value(&annotated).unwrap();
        assert_eq!(value["anomaly"], -1);
        assert_eq!(value["vehicle_id"], "V1");
        assert!(annotated.is_anomalous());
    }
}
