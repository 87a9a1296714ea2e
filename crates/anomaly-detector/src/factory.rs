//! Detector construction

use crate::{AnomalyDetector, DetectorConfig, DetectorError};
use inference_engine::{BinaryClassifier, LinearAutoregressor, LogisticClassifier, SequenceModel};
use tracing::debug;

/// Shape of detectors produced by this build (hybrid two-stage)
pub const DETECTOR_VERSION: u32 = 2;

/// Builds detectors of the current version from one configuration
#[derive(Debug, Clone, Default)]
pub struct DetectorFactory {
    config: DetectorConfig,
}

impl DetectorFactory {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn version(&self) -> u32 {
        DETECTOR_VERSION
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Untrained detector with the production backends
    pub fn build(&self) -> Result<AnomalyDetector, DetectorError> {
        self.with_backends(
            Box::new(LinearAutoregressor::new(self.config.predictor.clone())),
            Box::new(LogisticClassifier::new(self.config.classifier.clone())),
        )
    }

    /// Untrained detector with caller-supplied backends
    pub fn with_backends(
        &self,
        predictor: Box<dyn SequenceModel>,
        classifier: Box<dyn BinaryClassifier>,
    ) -> Result<AnomalyDetector, DetectorError> {
        debug!(
            "Building detector v{} (L={}, history={})",
            DETECTOR_VERSION, self.config.sequence_length, self.config.history_capacity
        );
        AnomalyDetector::from_parts(self.config.clone(), predictor, classifier)
    }
}

impl AnomalyDetector {
    /// Untrained detector with the production backends
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        DetectorFactory::new(config).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_untrained() {
        let detector = DetectorFactory::default().build().unwrap();
        assert!(!detector.is_trained());
        assert_eq!(detector.sequence_length(), 10);
        assert_eq!(detector.history().capacity(), 50);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let factory = DetectorFactory::new(DetectorConfig {
            sequence_length: 0,
            ..Default::default()
        });
        assert!(matches!(factory.build(), Err(DetectorError::InvalidConfig(_))));
        assert_eq!(factory.version(), DETECTOR_VERSION);
    }
}
