//! Detection verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary verdict for one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyLabel {
    Normal,
    Anomalous,
}

impl AnomalyLabel {
    /// External sign convention: -1 anomalous, 1 normal
    pub fn as_sign(&self) -> i8 {
        match self {
            AnomalyLabel::Normal => 1,
            AnomalyLabel::Anomalous => -1,
        }
    }

    pub fn is_anomalous(&self) -> bool {
        matches!(self, AnomalyLabel::Anomalous)
    }
}

impl From<bool> for AnomalyLabel {
    fn from(anomalous: bool) -> Self {
        if anomalous {
            AnomalyLabel::Anomalous
        } else {
            AnomalyLabel::Normal
        }
    }
}

impl fmt::Display for AnomalyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyLabel::Normal => write!(f, "normal"),
            AnomalyLabel::Anomalous => write!(f, "anomalous"),
        }
    }
}

/// Label, probability, and score from a single pass over one reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub label: AnomalyLabel,
    /// Anomaly probability in [0, 1]
    pub probability: f64,
    /// Negated probability; lower is more anomalous
    pub score: f64,
}
