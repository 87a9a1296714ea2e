//! Fixed-Order Feature Codec

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDateTime, Utc};
use ring_buffer::{Reading, SensorBlock};
use serde_json::Value;
use tracing::debug;

/// Number of raw sensor dimensions
pub const SENSOR_DIMENSION: usize = 5;

/// Raw or scaled values in `FEATURE_NAMES` order
pub type SensorVector = [f64; SENSOR_DIMENSION];

/// Sensor keys in vector order
pub const FEATURE_NAMES: [&str; SENSOR_DIMENSION] = [
    "engine_rpm",
    "engine_temp_c",
    "vibration_level_g",
    "throttle_pos_pct",
    "battery_voltage_v",
];

/// Timestamp layout used by dashboard logs
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maps readings to `[rpm, temp_c, vibration_g, throttle_pct, battery_v]`
pub struct FeatureCodec;

impl FeatureCodec {
    /// Encode a reading's sensor block
    pub fn encode(reading: &Reading) -> SensorVector {
        Self::encode_sensors(reading.sensors())
    }

    pub fn encode_sensors(sensors: &SensorBlock) -> SensorVector {
        [
            sensors.engine_rpm,
            sensors.engine_temp_c,
            sensors.vibration_level_g,
            f64::from(sensors.throttle_pos_pct),
            sensors.battery_voltage_v,
        ]
    }

    /// Decode a loosely-typed sensor block, requiring all five keys
    pub fn decode_sensors(value: &Value) -> Result<SensorBlock, ValidationError> {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::InvalidFormat("sensor block is not an object".into()))?;

        let mut values = [0.0; SENSOR_DIMENSION];
        for (slot, key) in values.iter_mut().zip(FEATURE_NAMES) {
            let field = object.get(key).ok_or(ValidationError::MissingField(key))?;
            *slot = field
                .as_f64()
                .ok_or_else(|| ValidationError::InvalidFormat(format!("{key} is not numeric")))?;
        }

        let throttle = values[3].round();
        if !(0.0..=100.0).contains(&throttle) {
            return Err(ValidationError::OutOfRange {
                field: "throttle_pos_pct",
                value: values[3],
                min: 0.0,
                max: 100.0,
            });
        }

        Ok(SensorBlock {
            engine_rpm: values[0],
            engine_temp_c: values[1],
            vibration_level_g: values[2],
            throttle_pos_pct: throttle as u8,
            battery_voltage_v: values[4],
        })
    }

    /// Decode a full reading (`vehicle_id`, `timestamp`, `sensors`)
    pub fn decode_reading(value: &Value) -> Result<Reading, ValidationError> {
        let vehicle_id = value
            .get("vehicle_id")
            .ok_or(ValidationError::MissingField("vehicle_id"))?
            .as_str()
            .ok_or_else(|| ValidationError::InvalidFormat("vehicle_id is not a string".into()))?;

        let timestamp = value
            .get("timestamp")
            .ok_or(ValidationError::MissingField("timestamp"))?
            .as_str()
            .ok_or_else(|| ValidationError::InvalidFormat("timestamp is not a string".into()))?;
        let timestamp = parse_timestamp(timestamp)?;

        let sensors = value
            .get("sensors")
            .ok_or(ValidationError::MissingField("sensors"))?;
        let sensors = Self::decode_sensors(sensors)?;

        debug!("Decoded reading for {} at {}", vehicle_id, timestamp);
        Ok(Reading::with_timestamp(vehicle_id, timestamp, sensors))
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ValidationError::InvalidFormat(format!("timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_order() {
        let reading = Reading::new(
            "V1",
            SensorBlock {
                engine_rpm: 2100.0,
                engine_temp_c: 91.5,
                vibration_level_g: 0.21,
                throttle_pos_pct: 35,
                battery_voltage_v: 13.95,
            },
        );
        assert_eq!(
            FeatureCodec::encode(&reading),
            [2100.0, 91.5, 0.21, 35.0, 13.95]
        );
    }

    #[test]
    fn test_missing_field() {
        let sensors = json!({
            "engine_rpm": 2000.0,
            "engine_temp_c": 90.0,
            "throttle_pos_pct": 30,
            "battery_voltage_v": 14.0
        });
        let err = FeatureCodec::decode_sensors(&sensors).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("vibration_level_g"));
    }

    #[test]
    fn test_non_numeric_field() {
        let sensors = json!({
            "engine_rpm": "fast",
            "engine_temp_c": 90.0,
            "vibration_level_g": 0.2,
            "throttle_pos_pct": 30,
            "battery_voltage_v": 14.0
        });
        assert!(matches!(
            FeatureCodec::decode_sensors(&sensors),
            Err(ValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_decode_dashboard_reading() {
        let value = json!({
            "vehicle_id": "HERO-MNM-01",
            "timestamp": "2024-05-01 10:15:00",
            "sensors": {
                "engine_rpm": 1800.25,
                "engine_temp_c": 89.1,
                "vibration_level_g": 0.223,
                "throttle_pos_pct": 27,
                "battery_voltage_v": 14.02
            }
        });
        let reading = FeatureCodec::decode_reading(&value).unwrap();
        assert_eq!(reading.vehicle_id(), "HERO-MNM-01");
        assert_eq!(reading.sensors().throttle_pos_pct, 27);
        assert_eq!(reading.timestamp().to_rfc3339(), "2024-05-01T10:15:00+00:00");
    }

    #[test]
    fn test_decode_missing_sensor_block() {
        let value = json!({ "vehicle_id": "V1", "timestamp": "2024-05-01T10:15:00Z" });
        assert_eq!(
            FeatureCodec::decode_reading(&value).unwrap_err(),
            ValidationError::MissingField("sensors")
        );
    }

    #[test]
    fn test_throttle_out_of_range() {
        let sensors = json!({
            "engine_rpm": 2000.0,
            "engine_temp_c": 90.0,
            "vibration_level_g": 0.2,
            "throttle_pos_pct": 140,
            "battery_voltage_v": 14.0
        });
        assert!(matches!(
            FeatureCodec::decode_sensors(&sensors),
            Err(ValidationError::OutOfRange { field: "throttle_pos_pct", .. })
        ));
    }
}
