//! Model Backends
//!
//! Trait seams for the two learned stages of the detector plus one
//! production implementation of each:
//! - `LinearAutoregressor`: ridge-regression forecaster of the next scaled vector
//! - `LogisticClassifier`: class-weighted logistic regression over composite vectors

mod classifier;
mod predictor;

pub use classifier::{
    positive_class_weight, BinaryClassifier, Classification, ClassifierConfig, LogisticClassifier,
};
pub use predictor::{build_windows, LinearAutoregressor, PredictorConfig, SequenceModel};

use thiserror::Error;

/// Errors during model fitting and inference
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Model used before fitting")]
    NotFitted,
    #[error("Insufficient training data: need more than {needed} samples, got {actual}")]
    InsufficientData { needed: usize, actual: usize },
    #[error("Training set contains a single class ({0})")]
    SingleClass(&'static str),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Numerical failure: {0}")]
    Numerical(String),
}

/// Summary of a completed fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    /// Training rows used
    pub samples: usize,
    /// Final training loss (MSE or weighted log-loss)
    pub loss: f64,
}
