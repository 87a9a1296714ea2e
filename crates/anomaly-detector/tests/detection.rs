//! End-to-end behaviour of the trained detector

use anomaly_detector::{AnomalyDetector, AnomalyLabel, DetectorConfig, DetectorError};
use feature_engine::{COMPOSITE_DIMENSION, INSUFFICIENT_HISTORY_BLOCK};
use proptest::prelude::*;
use ring_buffer::{Reading, SensorBlock};
use std::sync::{Mutex, OnceLock};
use vehicle_sim::{FaultKind, TelemetryGenerator};

const TRAINING_SAMPLES: usize = 300;

fn trained_detector() -> AnomalyDetector {
    let mut detector = AnomalyDetector::new(DetectorConfig::default()).unwrap();
    detector.train_initial_model(TRAINING_SAMPLES).unwrap();
    detector
}

fn shared_detector() -> &'static Mutex<AnomalyDetector> {
    static DETECTOR: OnceLock<Mutex<AnomalyDetector>> = OnceLock::new();
    DETECTOR.get_or_init(|| Mutex::new(trained_detector()))
}

fn readings(generator: &mut TelemetryGenerator, n: usize) -> Vec<Reading> {
    (0..n).map(|_| generator.generate_reading()).collect()
}

#[test]
fn test_too_few_samples_is_insufficient_data() {
    let mut detector = AnomalyDetector::new(DetectorConfig::default()).unwrap();
    let result = detector.train_initial_model(5);
    assert!(matches!(result, Err(DetectorError::InsufficientData(_))));
    assert!(!detector.is_trained());

    let result = detector.train_initial_model(10);
    assert!(matches!(result, Err(DetectorError::InsufficientData(_))));
}

#[test]
fn test_untrained_detector_refuses_readings() {
    let mut detector = AnomalyDetector::new(DetectorConfig::default()).unwrap();
    let reading = TelemetryGenerator::default().generate_reading();

    assert_eq!(detector.detect_anomaly(&reading), Err(DetectorError::NotTrained));
    assert_eq!(detector.get_anomaly_score(&reading), Err(DetectorError::NotTrained));
    assert!(detector.history().is_empty());
}

#[test]
fn test_false_positive_rate_on_healthy_stream() {
    let mut detector = trained_detector();
    let mut generator = TelemetryGenerator::new("FPR-01");

    let flagged = readings(&mut generator, 200)
        .iter()
        .filter(|r| detector.detect_anomaly(r).unwrap().is_anomalous())
        .count();

    assert!(flagged < 60, "{flagged} of 200 healthy readings flagged");
}

#[test]
fn test_vibration_fault_is_detected() {
    let mut detector = trained_detector();
    let mut generator = TelemetryGenerator::new("VIB-01");
    let warmup = readings(&mut generator, 20);
    detector.sync_history(&warmup);

    generator.inject_fault(Some(FaultKind::Vibration));
    let faulty = readings(&mut generator, 50);
    assert!(faulty.iter().all(|r| r.sensors().vibration_level_g > 1.0));

    let flagged = faulty
        .iter()
        .filter(|r| detector.detect_anomaly(r).unwrap() == AnomalyLabel::Anomalous)
        .count();
    assert!(flagged > 30, "only {flagged} of 50 vibration readings flagged");
}

#[test]
fn test_fault_from_first_reading_is_detected() {
    let mut detector = trained_detector();
    for fault in [FaultKind::Vibration, FaultKind::BatteryFailure, FaultKind::Overheat] {
        detector.sync_history(&[]);
        let mut generator = TelemetryGenerator::new("COLD-01");
        generator.inject_fault(Some(fault));

        let labels: Vec<bool> = readings(&mut generator, 30)
            .iter()
            .map(|r| detector.detect_anomaly(r).unwrap().is_anomalous())
            .collect();
        let before_full_window = labels[..10].iter().filter(|&&a| a).count();
        let total = labels.iter().filter(|&&a| a).count();
        assert!(
            before_full_window > 5,
            "{fault}: only {before_full_window} of the first 10 readings flagged"
        );
        assert!(total > 20, "{fault}: only {total} of 30 readings flagged");
    }
}

#[test]
fn test_sustained_fault_is_flagged_across_trainings() {
    let mut flagged_per_run = Vec::new();
    for _ in 0..3 {
        let mut detector = trained_detector();
        let mut generator = TelemetryGenerator::new("SUSTAIN-01");
        for reading in readings(&mut generator, 20) {
            detector.detect_anomaly(&reading).unwrap();
        }

        generator.inject_fault(Some(FaultKind::BatteryFailure));
        let flagged = readings(&mut generator, 30)
            .iter()
            .filter(|r| detector.detect_anomaly(r).unwrap().is_anomalous())
            .count();
        flagged_per_run.push(flagged);
    }

    assert!(
        flagged_per_run.iter().all(|&f| f > 15),
        "battery-failure readings flagged per training: {flagged_per_run:?}"
    );
}

#[test]
fn test_overheat_scores_lower_than_healthy() {
    let mut detector = trained_detector();
    let mut generator = TelemetryGenerator::new("HEAT-01");
    let healthy = readings(&mut generator, 30);
    detector.sync_history(&healthy);

    let healthy_score = detector.get_anomaly_score(&generator.generate_reading()).unwrap();
    generator.inject_fault(Some(FaultKind::Overheat));
    let mut overheat_score = 0.0;
    for reading in readings(&mut generator, 10) {
        overheat_score = detector.get_anomaly_score(&reading).unwrap();
    }

    assert!(overheat_score < healthy_score);
    assert!((-1.0..=0.0).contains(&overheat_score));
}

#[test]
fn test_synced_history_feeds_rolling_block() {
    let mut detector = trained_detector();
    let mut generator = TelemetryGenerator::new("SYNC-01");
    generator.inject_fault(Some(FaultKind::Vibration));
    let faulty = readings(&mut generator, 10);
    detector.sync_history(&faulty);

    generator.clear_fault();
    let current = generator.generate_reading();
    let features = detector.composite_features(&current).unwrap();

    assert!(!features.insufficient_history);
    assert!(features.rolling_mean()[2] > 1.0);
    assert_eq!(detector.history().len(), 10);

    detector.detect_anomaly(&current).unwrap();
    assert_eq!(detector.history().len(), 11);
    assert!(detector.history().ends_with(&current));
}

#[test]
fn test_composite_length_with_short_and_full_history() {
    let mut detector = shared_detector().lock().unwrap();
    let mut generator = TelemetryGenerator::default();
    let history = readings(&mut generator, 8);
    let reading = generator.generate_reading();

    detector.sync_history(&history[..3]);
    let short = detector.composite_features(&reading).unwrap();
    detector.sync_history(&history);
    let full = detector.composite_features(&reading).unwrap();

    assert_eq!(short.len(), COMPOSITE_DIMENSION);
    assert_eq!(full.len(), COMPOSITE_DIMENSION);
    assert_eq!(short.rolling(), &INSUFFICIENT_HISTORY_BLOCK[..]);
    assert_ne!(full.rolling(), &INSUFFICIENT_HISTORY_BLOCK[..]);
    assert_eq!(short.raw(), full.raw());
}

#[test]
fn test_score_after_detect_does_not_duplicate() {
    let mut detector = trained_detector();
    let mut generator = TelemetryGenerator::default();
    detector.sync_history(&readings(&mut generator, 20));

    let reading = generator.generate_reading();
    let first = detector.assess(&reading).unwrap();
    let score = detector.get_anomaly_score(&reading).unwrap();

    assert_eq!(detector.history().len(), 21);
    assert_eq!(score, first.score);
    assert_eq!(first.score, -first.probability);
    assert_eq!(first.label.is_anomalous(), first.probability >= 0.5);
}

#[test]
fn test_history_is_bounded() {
    let mut detector = trained_detector();
    let mut generator = TelemetryGenerator::default();
    let stream = readings(&mut generator, 60);
    for reading in &stream {
        detector.detect_anomaly(reading).unwrap();
    }

    assert_eq!(detector.history().len(), 50);
    assert!(detector.history().ends_with(&stream[59]));
    let oldest = detector.history().iter().next().unwrap();
    assert!(oldest.same_instance(&stream[10]));
}

#[test]
fn test_non_finite_reading_is_malformed() {
    let mut detector = trained_detector();
    let reading = Reading::new(
        "BROKEN-01",
        SensorBlock {
            engine_rpm: f64::NAN,
            engine_temp_c: 90.0,
            vibration_level_g: 0.2,
            throttle_pos_pct: 30,
            battery_voltage_v: 14.0,
        },
    );
    assert!(matches!(
        detector.detect_anomaly(&reading),
        Err(DetectorError::MalformedReading(_))
    ));
    assert!(detector.history().is_empty());
}

#[test]
fn test_decoded_reading_errors_convert() {
    let value = serde_json::json!({
        "vehicle_id": "JSON-01",
        "timestamp": "2024-05-01 10:00:00",
        "sensors": {
            "engine_rpm": 1500.0,
            "engine_temp_c": 90.0,
            "throttle_pos_pct": 20,
            "battery_voltage_v": 14.0
        }
    });
    let result: Result<Reading, DetectorError> =
        data_validator::FeatureCodec::decode_reading(&value).map_err(DetectorError::from);
    assert!(matches!(result, Err(DetectorError::MalformedReading(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_composite_length_constant(history_len in 0usize..60) {
        let mut detector = shared_detector().lock().unwrap();
        let mut generator = TelemetryGenerator::default();
        detector.sync_history(&readings(&mut generator, history_len));

        let reading = generator.generate_reading();
        let features = detector.composite_features(&reading).unwrap();
        prop_assert_eq!(features.len(), COMPOSITE_DIMENSION);
        prop_assert_eq!(features.insufficient_history, history_len < 5);
        prop_assert!(features.values.iter().all(|v| v.is_finite()));
    }
}
