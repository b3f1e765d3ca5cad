use std::fs;

use medrisk_model::{load_cost_model, load_model, ModelError};
use pretty_assertions::assert_eq;

const BOOSTER: &str = r#"{
  "learner": {
    "attributes": {},
    "feature_names": ["avg_days", "is_inpatient", "patient_count", "family_history"],
    "feature_types": ["float", "int", "int", "int"],
    "gradient_booster": {
      "name": "gbtree",
      "model": {
        "gbtree_model_param": {"num_parallel_tree": "1", "num_trees": "2"},
        "tree_info": [0, 0],
        "trees": [
          {
            "id": 0,
            "left_children": [1, 3, -1, -1, -1],
            "right_children": [2, 4, -1, -1, -1],
            "split_indices": [1, 0, 0, 0, 0],
            "split_conditions": [0.5, 14.0, 300000.0, 50000.0, 120000.0],
            "default_left": [0, 0, 0, 0, 0]
          },
          {
            "id": 1,
            "left_children": [1, -1, 3, -1, -1],
            "right_children": [2, -1, 4, -1, -1],
            "split_indices": [3, 0, 2, 0, 0],
            "split_conditions": [0.5, 0.0, 5000.0, 80000.0, 150000.0],
            "default_left": [false, false, false, false, false]
          }
        ]
      }
    },
    "learner_model_param": {"base_score": "5E5", "num_class": "0", "num_feature": "4"},
    "objective": {"name": "reg:squarederror", "reg_loss_param": {"scale_pos_weight": "1"}}
  },
  "version": [2, 0, 3]
}"#;

#[test]
fn xgboost_booster_from_file() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let path = tmp.path().join("xgb_model.json");
    fs::write(&path, BOOSTER).expect("write");

    let model = load_cost_model(&path).expect("load");
    assert_eq!(model.backend_type(), "xgboost");
    assert_eq!(model.num_features(), 4);

    // outpatient, short stay, no family history
    assert_eq!(model.predict(&[10.0, 0.0, 4000.0, 0.0]).unwrap(), 550_000.0);
    // inpatient with family history and a high-volume cancer type
    assert_eq!(model.predict(&[20.0, 1.0, 6000.0, 1.0]).unwrap(), 950_000.0);
    // family history, low volume
    assert_eq!(model.predict(&[20.0, 0.0, 100.0, 1.0]).unwrap(), 700_000.0);
}

#[test]
fn linear_model_from_file() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let path = tmp.path().join("linear.json");
    fs::write(&path, r#"{"weights":[1000.0,50000.0,1.0,20000.0],"bias":10000.0}"#).expect("write");

    let model = load_cost_model(&path).expect("load");
    assert_eq!(model.backend_type(), "linear");
    assert_eq!(model.predict(&[1.0, 1.0, 100.0, 1.0]).unwrap(), 81_100.0);
}

#[test]
fn wrong_feature_count_is_load_error() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let path = tmp.path().join("linear3.json");
    fs::write(&path, r#"{"weights":[1.0,1.0,1.0],"bias":0.0}"#).expect("write");

    assert!(load_model(&path).is_ok());
    let err = load_cost_model(&path).unwrap_err();
    assert!(matches!(err, ModelError::Load { .. }), "{err}");
}

#[test]
fn missing_or_corrupt_artifact_is_load_error() {
    let tmp = tempfile::tempdir().expect("tmpdir");

    let missing = tmp.path().join("absent.json");
    let err = load_cost_model(&missing).unwrap_err();
    assert!(err.to_string().contains("absent.json"), "{err}");

    let corrupt = tmp.path().join("corrupt.json");
    fs::write(&corrupt, "{ not json").expect("write");
    assert!(matches!(load_cost_model(&corrupt), Err(ModelError::Load { .. })));

    let unknown = tmp.path().join("unknown.json");
    fs::write(&unknown, r#"{"layers": []}"#).expect("write");
    assert!(matches!(load_cost_model(&unknown), Err(ModelError::Load { .. })));
}
