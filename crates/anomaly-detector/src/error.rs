//! Detector error taxonomy

use data_validator::ValidationError;
use inference_engine::InferenceError;
use thiserror::Error;
use vehicle_sim::FaultError;

/// Errors surfaced by the detector and monitoring session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("Detector used before train_initial_model succeeded")]
    NotTrained,

    #[error(transparent)]
    InvalidFault(#[from] FaultError),

    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    #[error("Malformed reading: {0}")]
    MalformedReading(#[from] ValidationError),

    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),

    #[error("Inference failed: {0}")]
    Inference(InferenceError),
}

impl From<InferenceError> for DetectorError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::InsufficientData { needed, actual } => DetectorError::InsufficientData(
                format!("need more than {needed} samples, got {actual}"),
            ),
            InferenceError::SingleClass(class) => {
                DetectorError::InsufficientData(format!("training set holds only {class} samples"))
            }
            other => DetectorError::Inference(other),
        }
    }
}
