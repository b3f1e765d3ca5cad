//! Occlusion-based feature attribution for a single prediction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{FeatureVector, ModelBackend, ModelError, FEATURE_NAMES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub value: f64,
    /// Model output minus the output with this feature set to its baseline
    pub contribution: f64,
}

/// The model handle and the exact row it scored.
///
/// Handed to presentation code that wants to explain a prediction; the
/// prediction result itself never carries the model.
#[derive(Debug, Clone)]
pub struct ExplainabilityContext {
    model: Arc<dyn ModelBackend>,
    features: FeatureVector,
}

impl ExplainabilityContext {
    pub fn new(model: Arc<dyn ModelBackend>, features: FeatureVector) -> Self {
        Self { model, features }
    }

    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    pub fn model(&self) -> &Arc<dyn ModelBackend> {
        &self.model
    }

    /// Contributions against an all-zero baseline row
    pub fn contributions(&self) -> Result<Vec<FeatureContribution>, ModelError> {
        self.contributions_against(&[0.0; 4])
    }

    pub fn contributions_against(
        &self,
        baseline: &[f64],
    ) -> Result<Vec<FeatureContribution>, ModelError> {
        let row = self.features.to_row();
        if baseline.len() != row.len() {
            return Err(ModelError::InvalidInput(format!(
                "baseline has {} values, expected {}",
                baseline.len(),
                row.len()
            )));
        }
        let full = self.model.predict(&row)?;

        let mut out = Vec::with_capacity(row.len());
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let mut occluded = row;
            occluded[i] = baseline[i];
            let without = self.model.predict(&occluded)?;
            out.push(FeatureContribution {
                feature: name.to_string(),
                value: row[i],
                contribution: full - without,
            });
        }
        Ok(out)
    }
}
