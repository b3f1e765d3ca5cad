//! Gradient-boosted regression trees read from an XGBoost JSON booster.
//!
//! Only the parts of the document needed for inference are read:
//! `learner.gradient_booster.model.trees`, `learner.learner_model_param`
//! and `learner.objective.name`. A node sends a row left when
//! `x < split_condition`; missing (NaN) values follow `default_left`. Leaf
//! values are stored in `split_conditions`.
//!
//! Inference runs in `f32` like XGBoost's own predictor: features are
//! narrowed before each comparison and the margin is accumulated from
//! `base_score` in `f32`, so the same artifact yields the same output.

use serde::Deserialize;

use crate::backend::{check_width, ModelBackend, ModelError};

/// Objectives whose output is the raw margin (identity link)
const IDENTITY_OBJECTIVES: &[&str] = &[
    "reg:squarederror",
    "reg:linear",
    "reg:absoluteerror",
    "reg:pseudohubererror",
];

#[derive(Deserialize)]
struct XgbDocument {
    learner: XgbLearner,
}

#[derive(Deserialize)]
struct XgbLearner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: XgbGradientBooster,
    learner_model_param: XgbModelParam,
    objective: XgbObjective,
}

#[derive(Deserialize)]
struct XgbGradientBooster {
    name: String,
    #[serde(default)]
    model: Option<XgbTreeModel>,
}

#[derive(Deserialize)]
struct XgbTreeModel {
    trees: Vec<XgbTree>,
}

#[derive(Deserialize)]
struct XgbTree {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    #[serde(default)]
    default_left: Vec<BoolOrInt>,
}

/// XGBoost 1.x writes `default_left` as booleans, 2.x as 0/1
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum BoolOrInt {
    Bool(bool),
    Int(i64),
}

impl BoolOrInt {
    fn as_bool(self) -> bool {
        match self {
            BoolOrInt::Bool(b) => b,
            BoolOrInt::Int(i) => i != 0,
        }
    }
}

#[derive(Deserialize)]
struct XgbModelParam {
    base_score: String,
    #[serde(default)]
    num_feature: Option<String>,
    #[serde(default)]
    num_class: Option<String>,
}

#[derive(Deserialize)]
struct XgbObjective {
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf {
        value: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_value(&self, row: &[f64]) -> f32 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = row[feature] as f32;
                    idx = if x.is_nan() {
                        if default_left {
                            left
                        } else {
                            right
                        }
                    } else if x < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// A validated tree ensemble ready for inference
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedTrees {
    base_score: f32,
    trees: Vec<Tree>,
    num_features: usize,
    feature_names: Vec<String>,
    objective: String,
}

impl GradientBoostedTrees {
    /// Parse and validate an XGBoost JSON document.
    ///
    /// `origin` names the artifact in error messages.
    pub fn from_json(text: &str, origin: &str) -> Result<Self, ModelError> {
        let doc: XgbDocument = serde_json::from_str(text).map_err(|e| load_err(origin, e))?;
        Self::from_document(doc, origin)
    }

    pub(crate) fn from_value(value: serde_json::Value, origin: &str) -> Result<Self, ModelError> {
        let doc: XgbDocument = serde_json::from_value(value).map_err(|e| load_err(origin, e))?;
        Self::from_document(doc, origin)
    }

    fn from_document(doc: XgbDocument, origin: &str) -> Result<Self, ModelError> {
        let learner = doc.learner;

        let objective = learner.objective.name;
        if !IDENTITY_OBJECTIVES.contains(&objective.as_str()) {
            return Err(load_err(
                origin,
                format!("unsupported objective '{objective}', expected a regression objective"),
            ));
        }
        if let Some(n) = learner.learner_model_param.num_class.as_deref() {
            if parse_count(n).unwrap_or(0) > 1 {
                return Err(load_err(origin, format!("multi-class model (num_class = {n})")));
            }
        }
        if learner.gradient_booster.name != "gbtree" {
            return Err(load_err(
                origin,
                format!(
                    "unsupported booster '{}', expected gbtree",
                    learner.gradient_booster.name
                ),
            ));
        }
        let model = learner
            .gradient_booster
            .model
            .ok_or_else(|| load_err(origin, "gradient booster has no model"))?;

        let base_score = parse_base_score(&learner.learner_model_param.base_score)
            .ok_or_else(|| {
                load_err(
                    origin,
                    format!(
                        "invalid base_score '{}'",
                        learner.learner_model_param.base_score
                    ),
                )
            })?;

        let trees = model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| build_tree(t).map_err(|e| load_err(origin, format!("tree {i}: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;

        let max_split = trees
            .iter()
            .flat_map(|t| t.nodes.iter())
            .filter_map(|n| match n {
                Node::Split { feature, .. } => Some(feature + 1),
                Node::Leaf { .. } => None,
            })
            .max()
            .unwrap_or(0);
        let num_features = match learner.learner_model_param.num_feature.as_deref() {
            Some(n) => parse_count(n)
                .ok_or_else(|| load_err(origin, format!("invalid num_feature '{n}'")))?,
            None => max_split.max(learner.feature_names.len()),
        };
        if max_split > num_features {
            return Err(load_err(
                origin,
                format!("split on feature {} but model has {num_features} features", max_split - 1),
            ));
        }
        if !learner.feature_names.is_empty() && learner.feature_names.len() != num_features {
            return Err(load_err(
                origin,
                format!(
                    "{} feature names for {num_features} features",
                    learner.feature_names.len()
                ),
            ));
        }

        log::debug!(
            "parsed {origin}: {} trees, {num_features} features, base_score {base_score}",
            trees.len()
        );
        Ok(Self {
            base_score,
            trees,
            num_features,
            feature_names: learner.feature_names,
            objective,
        })
    }

    /// Feature names recorded at training time, if any
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn base_score(&self) -> f64 {
        f64::from(self.base_score)
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }
}

impl ModelBackend for GradientBoostedTrees {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_width(self.num_features, features)?;
        let margin = self
            .trees
            .iter()
            .fold(self.base_score, |acc, t| acc + t.leaf_value(features));
        Ok(f64::from(margin))
    }

    fn num_features(&self) -> usize {
        self.num_features
    }

    fn backend_type(&self) -> &str {
        "xgboost"
    }
}

fn load_err(origin: &str, reason: impl ToString) -> ModelError {
    ModelError::Load {
        path: origin.to_string(),
        reason: reason.to_string(),
    }
}

/// `"5E-1"` or, from newer writers, `"[5E-1]"`
fn parse_base_score(raw: &str) -> Option<f32> {
    let s = raw.trim().trim_start_matches('[').trim_end_matches(']').trim();
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_count(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

fn build_tree(t: XgbTree) -> Result<Tree, String> {
    let n = t.left_children.len();
    if n == 0 {
        return Err("empty tree".into());
    }
    if t.right_children.len() != n || t.split_indices.len() != n || t.split_conditions.len() != n {
        return Err("node arrays have different lengths".into());
    }
    if !t.default_left.is_empty() && t.default_left.len() != n {
        return Err("default_left length does not match node count".into());
    }

    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let (l, r) = (t.left_children[i], t.right_children[i]);
        if l == -1 {
            nodes.push(Node::Leaf {
                value: t.split_conditions[i],
            });
            continue;
        }
        // Children always follow their parent, which also rules out cycles.
        let child = |c: i64| -> Result<usize, String> {
            usize::try_from(c)
                .ok()
                .filter(|&c| c > i && c < n)
                .ok_or_else(|| format!("node {i} has invalid child index {c}"))
        };
        let feature = usize::try_from(t.split_indices[i])
            .map_err(|_| format!("node {i} has negative split index"))?;
        nodes.push(Node::Split {
            feature,
            threshold: t.split_conditions[i],
            left: child(l)?,
            right: child(r)?,
            default_left: t.default_left.get(i).map(|d| d.as_bool()).unwrap_or(false),
        });
    }
    Ok(Tree { nodes })
}
