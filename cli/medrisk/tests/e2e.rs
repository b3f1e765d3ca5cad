use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const FEED: &str = r#"{"response": {"body": {"tableList": [{"items": {"item": [
  {"fncoNm": "한빛생명보험", "xcsmPlnpnCnt": "4200", "xcsmPlnpnDcdNm": "생명"},
  {"fncoNm": "누리생명보험", "xcsmPlnpnCnt": "3100", "xcsmPlnpnDcdNm": "생명", "mobileEnrollment": false},
  {"fncoNm": "소망생명보험", "xcsmPlnpnCnt": "1500", "xcsmPlnpnDcdNm": "생명"},
  {"fncoNm": "새싹생명보험", "xcsmPlnpnCnt": "200", "xcsmPlnpnDcdNm": "생명"}
]}}]}}}"#;

/// Tree ensemble: 300,000 for outpatients, 900,000 for inpatients
const BOOSTER: &str = r#"{
  "learner": {
    "feature_names": ["avg_days", "is_inpatient", "patient_count", "family_history"],
    "gradient_booster": {
      "name": "gbtree",
      "model": {"trees": [{
        "left_children": [1, -1, -1],
        "right_children": [2, -1, -1],
        "split_indices": [1, 0, 0],
        "split_conditions": [0.5, -200000.0, 400000.0],
        "default_left": [0, 0, 0]
      }]}
    },
    "learner_model_param": {"base_score": "[5E5]", "num_class": "0", "num_feature": "4"},
    "objective": {"name": "reg:squarederror"}
  },
  "version": [2, 1, 0]
}"#;

fn medrisk(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_medrisk"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn medrisk")
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let out = medrisk(dir.path(), &["init"]);
    assert!(out.status.success(), "medrisk init failed: {out:?}");

    let p = dir.path();
    fs::create_dir_all(p.join("data")).unwrap();
    fs::create_dir_all(p.join("model")).unwrap();
    fs::write(
        p.join("data/t1.csv"),
        "2023 암종별 진료 현황,,,\n명칭,인당진료비,인당입(내)원일수,진료인원\n위암,\"2,000,000\",10,\"25,000\"\n",
    )
    .unwrap();
    fs::write(p.join("data/t2.csv"), "소득분위,연평균소득\n1분위,12000000\n").unwrap();
    fs::write(
        p.join("data/t3.csv"),
        "구분,내원일당진료비\n상급종합병원,300000\n의원,100000\n",
    )
    .unwrap();
    fs::write(p.join("data/life_insurance_general.json"), FEED).unwrap();
    fs::write(p.join("model/xgb_model.json"), BOOSTER).unwrap();
    dir
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn e2e_init_refuses_to_overwrite() {
    let dir = project();
    let out = medrisk(dir.path(), &["init"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));
}

#[test]
fn e2e_check_summarizes_sources() {
    let dir = project();
    let out = medrisk(dir.path(), &["check"]);
    assert!(out.status.success(), "check failed: {out:?}");
    let text = stdout(&out);
    assert!(text.contains("cancer types:    1"), "{text}");
    assert!(text.contains("hospital types:  2"), "{text}");
    assert!(text.contains("insurers:        4 (large 2, medium 1, small 1)"), "{text}");
    assert!(text.contains("xgboost"), "{text}");
}

#[test]
fn e2e_predict_json_and_history() {
    let dir = project();
    let out = medrisk(
        dir.path(),
        &[
            "predict",
            "--cancer",
            "위암",
            "--age-group",
            "50s",
            "--region",
            "busan",
            "--hospital-type",
            "상급종합병원",
            "--income",
            "5000000",
            "--inpatient",
            "--json",
        ],
    );
    assert!(out.status.success(), "predict failed: {out:?}");
    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    // 900,000 x 1.5 on 5,000,000
    assert_eq!(doc["result"]["corrected_cost"], 1_350_000);
    assert_eq!(doc["result"]["risk_level"], "high");
    assert_eq!(doc["result"]["gauge_score"], 75);
    assert_eq!(doc["result"]["burden_ratio_pct"], 27.0);
    assert_eq!(doc["history_recorded"], true);
    let names: Vec<&str> = doc["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["한빛생명보험", "소망생명보험", "누리생명보험"]);

    let log = fs::read_to_string(dir.path().join("data/risk_history.csv")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines[0], "timestamp,region,age_group,risk_score");
    assert!(lines[1].ends_with(",busan,50s,75"), "{}", lines[1]);

    let out = medrisk(dir.path(), &["heatmap", "--json"]);
    assert!(out.status.success(), "heatmap failed: {out:?}");
    let cells: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(cells[0]["mean_risk_score"], 75.0);
    assert_eq!(cells[0]["count"], 1);
}

#[test]
fn e2e_predict_unknown_hospital_type_fails() {
    let dir = project();
    let out = medrisk(
        dir.path(),
        &[
            "predict",
            "--age-group",
            "30s",
            "--hospital-type",
            "ClinicX",
            "--income",
            "30000000",
        ],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("ClinicX"));
    assert!(!dir.path().join("data/risk_history.csv").exists());
}

#[test]
fn e2e_recommend_with_filters() {
    let dir = project();
    let out = medrisk(
        dir.path(),
        &["recommend", "--risk-level", "매우 높음", "--mobile-only"],
    );
    assert!(out.status.success(), "recommend failed: {out:?}");
    let text = stdout(&out);
    assert!(text.contains("한빛생명보험"), "{text}");
    assert!(!text.contains("누리생명보험"), "{text}");
    assert!(!text.contains("소망생명보험"), "{text}");

    let out = medrisk(dir.path(), &["recommend", "--risk-level", "Unknown"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown risk level"));
}

#[test]
fn e2e_missing_config_points_to_init() {
    let dir = tempfile::tempdir().unwrap();
    let out = medrisk(dir.path(), &["check"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("medrisk init"));
}
