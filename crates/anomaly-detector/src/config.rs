//! Detector configuration

use crate::DetectorError;
use feature_engine::ThresholdConfig;
use inference_engine::{ClassifierConfig, PredictorConfig};
use serde::{Deserialize, Serialize};

/// Detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Window length fed to the sequence predictor
    pub sequence_length: usize,

    /// Readings kept in the detection history
    pub history_capacity: usize,

    /// History readings summarised by the rolling statistics
    pub rolling_window: usize,

    /// Floor on synthetic samples generated per fault during training
    pub min_fault_samples: usize,

    /// Fault samples per fault as a share of the normal corpus
    pub fault_sample_ratio: f64,

    /// Rule indicator thresholds
    pub thresholds: ThresholdConfig,

    pub predictor: PredictorConfig,

    pub classifier: ClassifierConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sequence_length: 10,
            history_capacity: 50,
            rolling_window: 5,
            min_fault_samples: 50,
            fault_sample_ratio: 0.1,
            thresholds: ThresholdConfig::default(),
            predictor: PredictorConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Synthetic samples per fault for a normal corpus of `n_samples`
    pub fn fault_samples_for(&self, n_samples: usize) -> usize {
        let scaled = (n_samples as f64 * self.fault_sample_ratio) as usize;
        scaled.max(self.min_fault_samples)
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        let invalid = |msg: String| Err(DetectorError::InvalidConfig(msg));

        if self.sequence_length == 0 {
            return invalid("sequence_length must be at least 1".into());
        }
        if self.rolling_window == 0 {
            return invalid("rolling_window must be at least 1".into());
        }
        let longest = self.sequence_length.max(self.rolling_window);
        if self.history_capacity < longest {
            return invalid(format!(
                "history_capacity {} is smaller than the longest window {}",
                self.history_capacity, longest
            ));
        }
        if !(0.0..=1.0).contains(&self.fault_sample_ratio) {
            return invalid(format!(
                "fault_sample_ratio {} outside [0, 1]",
                self.fault_sample_ratio
            ));
        }
        if self.min_fault_samples == 0 {
            return invalid("min_fault_samples must be at least 1".into());
        }
        if !(self.predictor.ridge_lambda >= 0.0 && self.predictor.ridge_lambda.is_finite()) {
            return invalid(format!("ridge_lambda {} must be >= 0", self.predictor.ridge_lambda));
        }

        let classifier = &self.classifier;
        if classifier.epochs == 0 {
            return invalid("classifier.epochs must be at least 1".into());
        }
        if !(classifier.learning_rate > 0.0 && classifier.learning_rate.is_finite()) {
            return invalid(format!("learning_rate {} must be > 0", classifier.learning_rate));
        }
        if !(classifier.l2_penalty >= 0.0 && classifier.l2_penalty.is_finite()) {
            return invalid(format!("l2_penalty {} must be >= 0", classifier.l2_penalty));
        }
        if !(classifier.decision_threshold > 0.0 && classifier.decision_threshold < 1.0) {
            return invalid(format!(
                "decision_threshold {} outside (0, 1)",
                classifier.decision_threshold
            ));
        }
        Ok(())
    }
}
