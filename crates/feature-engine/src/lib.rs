//! Feature Engineering Engine
//!
//! Fuses raw sensor values, sequence predictions, prediction errors,
//! threshold indicators, and rolling statistics into the fixed-length
//! composite vector consumed by the anomaly classifier.

mod features;
mod statistics;
mod thresholds;

pub use features::{
    ClassificationFeatureBuilder, CompositeFeatures, COMPOSITE_DIMENSION,
    INSUFFICIENT_HISTORY_BLOCK, ROLLING_BLOCK_DIMENSION,
};
pub use statistics::{RollingStatistics, StatisticalFeatures};
pub use thresholds::{ThresholdConfig, RULE_INDICATOR_COUNT};
