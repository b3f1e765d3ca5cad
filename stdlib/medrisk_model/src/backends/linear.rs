//! Linear cost model: y = W·x + b

use serde::{Deserialize, Serialize};

use crate::backend::{check_width, ModelBackend, ModelError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearBackend {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearBackend {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }
}

impl ModelBackend for LinearBackend {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_width(self.weights.len(), features)?;
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum();
        Ok(dot + self.bias)
    }

    fn num_features(&self) -> usize {
        self.weights.len()
    }

    fn backend_type(&self) -> &str {
        "linear"
    }
}
