//! Cost model loading and inference.
//!
//! The cost model is a regression over a fixed four-column feature row
//! (see [`FEATURE_NAMES`]). Backends implement [`ModelBackend`]; the loader
//! picks one from the artifact's content.

pub mod backend;
pub mod backends;
pub mod explain;

use std::path::Path;
use std::sync::Arc;

pub use backend::{FeatureVector, ModelBackend, ModelError, FEATURE_NAMES};
pub use backends::{load_model, GradientBoostedTrees, LinearBackend};
pub use explain::{ExplainabilityContext, FeatureContribution};

/// Load a model artifact and check it scores the cost feature row.
pub fn load_cost_model(path: impl AsRef<Path>) -> Result<Arc<dyn ModelBackend>, ModelError> {
    let path = path.as_ref();
    let model = load_model(path)?;
    if model.num_features() != FEATURE_NAMES.len() {
        return Err(ModelError::Load {
            path: path.display().to_string(),
            reason: format!(
                "model expects {} features, cost model needs {} ({})",
                model.num_features(),
                FEATURE_NAMES.len(),
                FEATURE_NAMES.join(", ")
            ),
        });
    }
    log::info!(
        "loaded {} cost model from {}",
        model.backend_type(),
        path.display()
    );
    Ok(model)
}
