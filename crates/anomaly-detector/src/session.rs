//! Per-vehicle monitoring session

use crate::{AnomalyDetector, Assessment, DetectorConfig, DetectorError};
use ring_buffer::{AnnotatedReading, Reading};
use std::collections::VecDeque;
use tracing::info;
use vehicle_sim::{FaultKind, TelemetryGenerator};

/// One vehicle's live loop: a generator, a detector, and the annotated log
/// that is authoritative for the detector history.
#[derive(Debug)]
pub struct MonitoringSession {
    generator: TelemetryGenerator,
    detector: AnomalyDetector,
    log: VecDeque<AnnotatedReading>,
    log_capacity: usize,
}

impl MonitoringSession {
    /// Session with a fresh generator and production detector
    pub fn new(vehicle_id: impl Into<String>, config: DetectorConfig) -> Result<Self, DetectorError> {
        let detector = AnomalyDetector::new(config)?;
        Ok(Self::with_detector(TelemetryGenerator::new(vehicle_id), detector))
    }

    pub fn with_detector(generator: TelemetryGenerator, detector: AnomalyDetector) -> Self {
        let log_capacity = detector.config().history_capacity;
        Self {
            generator,
            detector,
            log: VecDeque::with_capacity(log_capacity),
            log_capacity,
        }
    }

    pub fn vehicle_id(&self) -> &str {
        self.generator.vehicle_id()
    }

    pub fn train(&mut self, n_samples: usize) -> Result<(), DetectorError> {
        self.detector.train_initial_model(n_samples)
    }

    pub fn is_trained(&self) -> bool {
        self.detector.is_trained()
    }

    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    pub fn active_fault(&self) -> Option<FaultKind> {
        self.generator.active_fault()
    }

    pub fn inject_fault(&mut self, fault: Option<FaultKind>) {
        self.generator.inject_fault(fault);
    }

    /// Select a fault by tag; unknown tags keep the current fault
    pub fn inject_fault_named(&mut self, tag: &str) -> Result<(), DetectorError> {
        Ok(self.generator.inject_fault_named(tag)?)
    }

    pub fn clear_fault(&mut self) {
        self.generator.clear_fault();
    }

    /// Generate, assess, and log one reading
    pub fn step(&mut self) -> Result<AnnotatedReading, DetectorError> {
        self.sync_detector();

        let reading = self.generator.generate_reading();
        let assessment = self.detector.assess(&reading)?;
        let annotated = annotate(reading, &assessment);

        if self.log.len() == self.log_capacity {
            self.log.pop_front();
        }
        self.log.push_back(annotated.clone());
        self.sync_detector();

        Ok(annotated)
    }

    /// Annotated readings, oldest first
    pub fn log(&self) -> &VecDeque<AnnotatedReading> {
        &self.log
    }

    pub fn clear_log(&mut self) {
        info!("Clearing session log for {}", self.generator.vehicle_id());
        self.log.clear();
        self.sync_detector();
    }

    fn sync_detector(&mut self) {
        let readings: Vec<Reading> = self.log.iter().map(|a| a.reading.clone()).collect();
        self.detector.sync_history(&readings);
    }
}

fn annotate(reading: Reading, assessment: &Assessment) -> AnnotatedReading {
    AnnotatedReading {
        reading,
        anomaly: assessment.label.as_sign(),
        anomaly_score: assessment.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_requires_training() {
        let mut session = MonitoringSession::new("TEST-01", DetectorConfig::default()).unwrap();
        assert_eq!(session.step(), Err(DetectorError::NotTrained));
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_invalid_fault_keeps_previous() {
        let mut session = MonitoringSession::new("TEST-01", DetectorConfig::default()).unwrap();
        session.inject_fault(Some(FaultKind::Overheat));
        assert!(matches!(
            session.inject_fault_named("flat_tyre"),
            Err(DetectorError::InvalidFault(_))
        ));
        assert_eq!(session.active_fault(), Some(FaultKind::Overheat));
        session.clear_fault();
        assert_eq!(session.active_fault(), None);
    }
}
