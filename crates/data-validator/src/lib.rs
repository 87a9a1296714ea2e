//! Reading Encoding, Validation and Scaling
//!
//! Provides the fixed-order feature codec, physiological range checking,
//! and the frozen min-max scaler used by the detector.

mod codec;
mod error;
mod scaler;
mod validator;

pub use codec::{FeatureCodec, SensorVector, FEATURE_NAMES, SENSOR_DIMENSION};
pub use error::ValidationError;
pub use scaler::FeatureScaler;
pub use validator::{SensorRanges, ValidationResult, Validator};
