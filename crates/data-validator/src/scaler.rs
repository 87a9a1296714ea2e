//! Frozen Min-Max Feature Scaling

use crate::codec::{SensorVector, SENSOR_DIMENSION};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest range used as a divisor for constant dimensions
const MIN_RANGE: f64 = 1e-9;

/// Min-max normalization parameters over the five raw sensor dimensions.
///
/// Fitted once from the normal-only training corpus and read-only afterwards.
/// Values outside the fitted range map outside `[0, 1]`; nothing is clipped,
/// so faulted readings keep their distance from normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    min: SensorVector,
    max: SensorVector,
}

impl FeatureScaler {
    /// Fit on a corpus of raw vectors
    pub fn fit(corpus: &[SensorVector]) -> Result<Self, ValidationError> {
        if corpus.is_empty() {
            return Err(ValidationError::EmptyCorpus);
        }

        let mut min = [f64::MAX; SENSOR_DIMENSION];
        let mut max = [f64::MIN; SENSOR_DIMENSION];
        for row in corpus {
            for d in 0..SENSOR_DIMENSION {
                min[d] = min[d].min(row[d]);
                max[d] = max[d].max(row[d]);
            }
        }

        debug!("Fitted scaler on {} vectors: min={:?} max={:?}", corpus.len(), min, max);
        Ok(Self { min, max })
    }

    /// Scale one raw vector
    pub fn transform(&self, raw: &SensorVector) -> SensorVector {
        let mut scaled = [0.0; SENSOR_DIMENSION];
        for d in 0..SENSOR_DIMENSION {
            let range = (self.max[d] - self.min[d]).max(MIN_RANGE);
            scaled[d] = (raw[d] - self.min[d]) / range;
        }
        scaled
    }

    pub fn transform_all(&self, raw: &[SensorVector]) -> Vec<SensorVector> {
        raw.iter().map(|row| self.transform(row)).collect()
    }

    pub fn min(&self) -> &SensorVector {
        &self.min
    }

    pub fn max(&self) -> &SensorVector {
        &self.max
    }
}
