//! Backend trait, feature row and error types for model inference

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column order of the cost model's input row
pub const FEATURE_NAMES: [&str; 4] = ["avg_days", "is_inpatient", "patient_count", "family_history"];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model from {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// One input row for the cost model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub avg_days: f64,
    pub is_inpatient: bool,
    pub patient_count: u64,
    pub family_history: bool,
}

impl FeatureVector {
    /// Numeric row in [`FEATURE_NAMES`] order; flags encode as 0/1
    pub fn to_row(&self) -> [f64; 4] {
        [
            self.avg_days,
            if self.is_inpatient { 1.0 } else { 0.0 },
            self.patient_count as f64,
            if self.family_history { 1.0 } else { 0.0 },
        ]
    }
}

/// Pluggable inference backend producing one scalar per input row
pub trait ModelBackend: Send + Sync + std::fmt::Debug {
    /// Score a single row
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        rows.iter().map(|r| self.predict(r)).collect()
    }

    /// Width of the input row this model scores
    fn num_features(&self) -> usize;

    fn backend_type(&self) -> &str;
}

pub(crate) fn check_width(expected: usize, features: &[f64]) -> Result<(), ModelError> {
    if features.len() != expected {
        return Err(ModelError::InvalidInput(format!(
            "expected {expected} features, got {}",
            features.len()
        )));
    }
    Ok(())
}
