//! Class-Weighted Binary Classifier

use crate::{InferenceError, TrainingReport};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Standardised training inputs are clipped to this many deviations
const Z_CLIP: f64 = 6.0;
/// Floor for per-feature deviation during standardisation
const MIN_STD: f64 = 1e-9;

/// Verdict for one composite vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub is_anomaly: bool,
    /// Anomaly probability in [0, 1]
    pub probability: f64,
}

/// Normal-vs-anomalous classifier over fixed-length vectors
pub trait BinaryClassifier: Send + std::fmt::Debug {
    /// Fit on rows labelled `true` for anomalous
    fn fit(&mut self, features: &[Vec<f64>], labels: &[bool]) -> Result<TrainingReport, InferenceError>;

    /// Anomaly probability for one row
    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError>;

    fn is_fitted(&self) -> bool;

    /// Probability at or above which a row is anomalous
    fn decision_threshold(&self) -> f64 {
        0.5
    }

    fn classify(&self, features: &[f64]) -> Result<Classification, InferenceError> {
        let probability = self.predict_proba(features)?;
        Ok(Classification {
            is_anomaly: probability >= self.decision_threshold(),
            probability,
        })
    }
}

/// Weight of the anomalous class: `#normal / #anomaly`, or 1.0 without anomalies
pub fn positive_class_weight(labels: &[bool]) -> f64 {
    let anomalies = labels.iter().filter(|&&l| l).count();
    let normal = labels.len() - anomalies;
    if anomalies == 0 {
        1.0
    } else {
        normal as f64 / anomalies as f64
    }
}

/// Classifier hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Full-batch gradient steps
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2_penalty: f64,
    /// Probability at or above which a row is anomalous
    pub decision_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            epochs: 600,
            learning_rate: 0.5,
            l2_penalty: 1e-3,
            decision_threshold: 0.5,
        }
    }
}

/// Learned parameters of a fitted logistic model
#[derive(Debug, Clone)]
struct LogisticParameters {
    mean: Array1<f64>,
    std: Array1<f64>,
    /// Per-feature standardised range seen in training
    lower: Array1<f64>,
    upper: Array1<f64>,
    weights: Array1<f64>,
    bias: f64,
}

/// Logistic regression with positive-class weighting.
///
/// Inputs are z-scored with statistics of the training set and clipped to
/// ±6 deviations, then fitted by gradient descent on weighted binary
/// cross-entropy with an L2 penalty. At inference each standardised input is
/// clamped to the range it spanned in training, so the logit never
/// extrapolates beyond values the model was fitted on.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    config: ClassifierConfig,
    params: Option<LogisticParameters>,
}

impl LogisticClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            params: None,
        }
    }

    fn standardize(x: &mut Array2<f64>, mean: &Array1<f64>, std: &Array1<f64>) {
        for mut row in x.rows_mut() {
            row -= mean;
            row /= std;
            row.mapv_inplace(|z| z.clamp(-Z_CLIP, Z_CLIP));
        }
    }
}

impl Default for LogisticClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl BinaryClassifier for LogisticClassifier {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[bool]) -> Result<TrainingReport, InferenceError> {
        if features.len() != labels.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} labels", features.len()),
                actual: format!("{} labels", labels.len()),
            });
        }
        if !labels.iter().any(|&l| l) {
            return Err(InferenceError::SingleClass("normal"));
        }
        if labels.iter().all(|&l| l) {
            return Err(InferenceError::SingleClass("anomalous"));
        }

        let n = features.len();
        let d = features[0].len();
        let mut flat = Vec::with_capacity(n * d);
        for row in features {
            if row.len() != d {
                return Err(InferenceError::InvalidInputShape {
                    expected: format!("{d} features"),
                    actual: format!("{} features", row.len()),
                });
            }
            flat.extend_from_slice(row);
        }
        let mut x = Array2::from_shape_vec((n, d), flat)
            .map_err(|e| InferenceError::Numerical(e.to_string()))?;

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| InferenceError::Numerical("empty training matrix".into()))?;
        let std = x.std_axis(Axis(0), 0.0).mapv(|s| if s < MIN_STD { 1.0 } else { s });
        Self::standardize(&mut x, &mean, &std);
        let lower = x.fold_axis(Axis(0), f64::INFINITY, |acc, &z| acc.min(z));
        let upper = x.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &z| acc.max(z));

        let pos_weight = positive_class_weight(labels);
        let y: Array1<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        let sample_weight: Array1<f64> = labels.iter().map(|&l| if l { pos_weight } else { 1.0 }).collect();
        let total_weight = sample_weight.sum();

        let mut weights = Array1::<f64>::zeros(d);
        let mut bias = 0.0;
        let mut loss = f64::NAN;
        for epoch in 0..self.config.epochs {
            let logits = x.dot(&weights) + bias;
            let p = logits.mapv(sigmoid);

            let residual = (&p - &y) * &sample_weight;
            let grad_w = x.t().dot(&residual) / total_weight + &weights * self.config.l2_penalty;
            let grad_b = residual.sum() / total_weight;

            weights.scaled_add(-self.config.learning_rate, &grad_w);
            bias -= self.config.learning_rate * grad_b;

            if epoch + 1 == self.config.epochs || epoch % 100 == 0 {
                loss = p
                    .iter()
                    .zip(y.iter())
                    .zip(sample_weight.iter())
                    .map(|((&p, &y), &w)| {
                        let p = p.clamp(1e-12, 1.0 - 1e-12);
                        -w * (y * p.ln() + (1.0 - y) * (1.0 - p).ln())
                    })
                    .sum::<f64>()
                    / total_weight;
                debug!("Classifier epoch {}: weighted log-loss {:.5}", epoch, loss);
            }
        }

        if !loss.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(InferenceError::Numerical("classifier training diverged".into()));
        }

        info!(
            "Anomaly classifier fitted: {} rows ({} features), positive weight {:.3}, loss {:.5}",
            n, d, pos_weight, loss
        );

        self.params = Some(LogisticParameters {
            mean,
            std,
            lower,
            upper,
            weights,
            bias,
        });
        Ok(TrainingReport { samples: n, loss })
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let params = self.params.as_ref().ok_or(InferenceError::NotFitted)?;
        if features.len() != params.weights.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} features", params.weights.len()),
                actual: format!("{} features", features.len()),
            });
        }

        let logit = features
            .iter()
            .enumerate()
            .map(|(j, &x)| {
                let z = (x - params.mean[j]) / params.std[j];
                z.clamp(params.lower[j], params.upper[j]) * params.weights[j]
            })
            .sum::<f64>()
            + params.bias;
        Ok(sigmoid(logit))
    }

    fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    fn decision_threshold(&self) -> f64 {
        self.config.decision_threshold
    }
}
