//! Next-Vector Sequence Predictor

use crate::{InferenceError, TrainingReport};
use data_validator::{SensorVector, SENSOR_DIMENSION};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Forecasts the next scaled feature vector from a fixed-length window
pub trait SequenceModel: Send + std::fmt::Debug {
    /// Fit on a chronological sequence of scaled vectors
    fn fit(
        &mut self,
        sequence: &[SensorVector],
        sequence_length: usize,
    ) -> Result<TrainingReport, InferenceError>;

    /// Predict the vector following `window` (exactly `sequence_length` rows)
    fn predict(&self, window: &[SensorVector]) -> Result<SensorVector, InferenceError>;

    /// Window length the model was fitted with
    fn sequence_length(&self) -> Option<usize>;

    fn is_fitted(&self) -> bool {
        self.sequence_length().is_some()
    }
}

/// Split a sequence into overlapping (window, next vector) pairs.
///
/// Produces `N - L` pairs; fails when `N <= L`.
pub fn build_windows(
    sequence: &[SensorVector],
    sequence_length: usize,
) -> Result<(Vec<&[SensorVector]>, Vec<SensorVector>), InferenceError> {
    if sequence_length == 0 || sequence.len() <= sequence_length {
        return Err(InferenceError::InsufficientData {
            needed: sequence_length,
            actual: sequence.len(),
        });
    }

    let pairs = sequence.len() - sequence_length;
    let mut windows = Vec::with_capacity(pairs);
    let mut targets = Vec::with_capacity(pairs);
    for start in 0..pairs {
        windows.push(&sequence[start..start + sequence_length]);
        targets.push(sequence[start + sequence_length]);
    }
    Ok((windows, targets))
}

/// Predictor hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Ridge penalty on the window coefficients
    pub ridge_lambda: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self { ridge_lambda: 1e-4 }
    }
}

/// Multivariate linear autoregression over the flattened window.
///
/// The window's `L × 5` values plus a bias term map linearly to the next
/// vector; coefficients minimise squared error with a ridge penalty, solved
/// in closed form.
#[derive(Debug, Clone)]
pub struct LinearAutoregressor {
    config: PredictorConfig,
    /// `(L*5 + 1) × 5` coefficients, bias in the last row
    coefficients: Option<Array2<f64>>,
    sequence_length: Option<usize>,
}

impl LinearAutoregressor {
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            coefficients: None,
            sequence_length: None,
        }
    }

    fn design_row(window: &[SensorVector], row: &mut [f64]) {
        for (t, vector) in window.iter().enumerate() {
            row[t * SENSOR_DIMENSION..(t + 1) * SENSOR_DIMENSION].copy_from_slice(vector);
        }
        if let Some(bias) = row.last_mut() {
            *bias = 1.0;
        }
    }
}

impl Default for LinearAutoregressor {
    fn default() -> Self {
        Self::new(PredictorConfig::default())
    }
}

impl SequenceModel for LinearAutoregressor {
    fn fit(
        &mut self,
        sequence: &[SensorVector],
        sequence_length: usize,
    ) -> Result<TrainingReport, InferenceError> {
        let (windows, targets) = build_windows(sequence, sequence_length)?;
        let n = windows.len();
        let inputs = sequence_length * SENSOR_DIMENSION + 1;

        let mut x = Array2::<f64>::zeros((n, inputs));
        let mut y = Array2::<f64>::zeros((n, SENSOR_DIMENSION));
        for (i, (window, target)) in windows.iter().zip(&targets).enumerate() {
            let mut row = x.row_mut(i);
            let row = row
                .as_slice_mut()
                .ok_or_else(|| InferenceError::Numerical("non-contiguous design row".into()))?;
            Self::design_row(window, row);
            for d in 0..SENSOR_DIMENSION {
                y[[i, d]] = target[d];
            }
        }

        // Normal equations; the bias column is not penalised
        let mut gram = x.t().dot(&x);
        for j in 0..inputs - 1 {
            gram[[j, j]] += self.config.ridge_lambda * n as f64;
        }
        let rhs = x.t().dot(&y);

        let solution = DMatrix::from_fn(inputs, inputs, |i, j| gram[[i, j]])
            .cholesky()
            .ok_or_else(|| {
                InferenceError::Numerical("normal equations are not positive definite".into())
            })?
            .solve(&DMatrix::from_fn(inputs, SENSOR_DIMENSION, |i, d| rhs[[i, d]]));
        let coefficients =
            Array2::from_shape_fn((inputs, SENSOR_DIMENSION), |(i, d)| solution[(i, d)]);

        let residual = &x.dot(&coefficients) - &y;
        let mse = residual.mapv(|r| r * r).mean().unwrap_or(0.0);
        info!(
            "Sequence predictor fitted: {} windows of length {}, mse={:.6}",
            n, sequence_length, mse
        );

        self.coefficients = Some(coefficients);
        self.sequence_length = Some(sequence_length);
        Ok(TrainingReport {
            samples: n,
            loss: mse,
        })
    }

    fn predict(&self, window: &[SensorVector]) -> Result<SensorVector, InferenceError> {
        let (coefficients, sequence_length) = match (&self.coefficients, self.sequence_length) {
            (Some(c), Some(l)) => (c, l),
            _ => return Err(InferenceError::NotFitted),
        };
        if window.len() != sequence_length {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{sequence_length} vectors"),
                actual: format!("{} vectors", window.len()),
            });
        }

        let mut row = vec![0.0; coefficients.nrows()];
        Self::design_row(window, &mut row);
        let prediction = coefficients.t().dot(&Array1::from(row));

        let mut out = [0.0; SENSOR_DIMENSION];
        for (slot, value) in out.iter_mut().zip(prediction.iter()) {
            *slot = *value;
        }
        debug!("Sequence prediction: {:?}", out);
        Ok(out)
    }

    fn sequence_length(&self) -> Option<usize> {
        self.sequence_length
    }
}
