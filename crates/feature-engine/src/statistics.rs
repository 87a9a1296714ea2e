//! Statistical Features Computation

use data_validator::{SensorVector, SENSOR_DIMENSION};

/// Statistical features for a signal
#[derive(Debug, Clone, Default)]
pub struct StatisticalFeatures {
    /// Mean value
    pub mean: f64,
    /// Standard deviation (population)
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl StatisticalFeatures {
    /// Compute statistical features from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }
}

/// Per-sensor statistics over a window of raw vectors
#[derive(Debug, Clone, Default)]
pub struct RollingStatistics {
    pub mean: SensorVector,
    pub std_dev: SensorVector,
    pub max: SensorVector,
    pub min: SensorVector,
}

impl RollingStatistics {
    pub fn compute(window: &[SensorVector]) -> Self {
        let mut stats = Self::default();
        for d in 0..SENSOR_DIMENSION {
            let column: Vec<f64> = window.iter().map(|row| row[d]).collect();
            let features = StatisticalFeatures::compute(&column);
            stats.mean[d] = features.mean;
            stats.std_dev[d] = features.std_dev;
            stats.max[d] = features.max;
            stats.min[d] = features.min;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.mean - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_std_dev_computation() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.std_dev - 2.0).abs() < 1e-9);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_empty_values() {
        let values: Vec<f64> = vec![];
        let stats = StatisticalFeatures::compute(&values);
        assert_eq!(stats.mean, 0.0);
    }

    #[test]
    fn test_rolling_per_column() {
        let window = [
            [1000.0, 90.0, 0.2, 20.0, 14.0],
            [2000.0, 92.0, 0.3, 40.0, 14.0],
        ];
        let stats = RollingStatistics::compute(&window);
        assert_eq!(stats.mean, [1500.0, 91.0, 0.25, 30.0, 14.0]);
        assert_eq!(stats.max[0], 2000.0);
        assert_eq!(stats.min[3], 20.0);
        assert_eq!(stats.std_dev[4], 0.0);
    }
}
