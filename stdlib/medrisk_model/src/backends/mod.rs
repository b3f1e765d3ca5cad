//! Backend implementations and the artifact loader

pub mod linear;
pub mod xgboost;

pub use linear::LinearBackend;
pub use xgboost::GradientBoostedTrees;

use std::path::Path;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::backend::{ModelBackend, ModelError};

/// Load a model artifact, choosing the backend from the document shape:
/// a `learner` object is an XGBoost booster, a `weights` array a linear model.
pub fn load_model(path: &Path) -> Result<Arc<dyn ModelBackend>, ModelError> {
    let origin = path.display().to_string();
    let load_err = |reason: String| ModelError::Load {
        path: origin.clone(),
        reason,
    };

    let text = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    let doc: JsonValue = serde_json::from_str(&text).map_err(|e| load_err(e.to_string()))?;

    if doc.get("learner").is_some() {
        Ok(Arc::new(GradientBoostedTrees::from_value(doc, &origin)?))
    } else if doc.get("weights").is_some() {
        let linear: LinearBackend =
            serde_json::from_value(doc).map_err(|e| load_err(e.to_string()))?;
        Ok(Arc::new(linear))
    } else {
        Err(load_err(
            "unrecognized model format (expected an XGBoost booster or linear weights)".into(),
        ))
    }
}
