//! `medrisk.toml`: source locations, model artifact, history log and risk
//! thresholds. Relative paths resolve against the config file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use medrisk_data::{FeedOptions, SourcePaths};

use crate::error::ConfigError;
use crate::risk::RiskThresholds;

pub const CONFIG_FILE: &str = "medrisk.toml";

pub const DEFAULT_NAME_KEYWORD: &str = "보험";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedRiskConfig {
    #[serde(default = "default_sources")]
    pub sources: SourcePaths,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub insurance: InsuranceConfig,
    #[serde(default)]
    pub risk: RiskThresholds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/xgb_model.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/risk_history.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceConfig {
    /// Only insurers whose name contains this token are loaded; empty disables
    #[serde(default = "default_name_keyword")]
    pub name_keyword: String,
}

impl Default for InsuranceConfig {
    fn default() -> Self {
        Self {
            name_keyword: default_name_keyword(),
        }
    }
}

fn default_name_keyword() -> String {
    DEFAULT_NAME_KEYWORD.to_string()
}

fn default_sources() -> SourcePaths {
    SourcePaths {
        cancer_stats: PathBuf::from("data/t1.csv"),
        income_stats: PathBuf::from("data/t2.csv"),
        hospital_costs: PathBuf::from("data/t3.csv"),
        insurance_feed: PathBuf::from("data/life_insurance_general.json"),
    }
}

impl Default for MedRiskConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            model: ModelConfig::default(),
            history: HistoryConfig::default(),
            insurance: InsuranceConfig::default(),
            risk: RiskThresholds::default(),
        }
    }
}

impl MedRiskConfig {
    pub fn feed_options(&self) -> FeedOptions {
        let keyword = self.insurance.name_keyword.trim();
        FeedOptions {
            name_keyword: (!keyword.is_empty()).then(|| keyword.to_string()),
        }
    }

    /// Make every relative path absolute against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.sources.cancer_stats,
            &mut self.sources.income_stats,
            &mut self.sources.hospital_costs,
            &mut self.sources.insurance_feed,
            &mut self.model.path,
            &mut self.history.path,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

pub fn parse_config(text: &str) -> Result<MedRiskConfig, toml::de::Error> {
    toml::from_str::<MedRiskConfig>(text)
}

/// Read, parse, resolve and validate a config file
pub fn load(path: &Path) -> Result<MedRiskConfig, ConfigError> {
    let origin = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: origin.clone(),
        source,
    })?;
    let mut config = parse_config(&text).map_err(|source| ConfigError::Parse {
        path: origin,
        source,
    })?;
    config.risk.validate()?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.resolve_paths(base);
    log::debug!("loaded config {}", path.display());
    Ok(config)
}

/// Commented default config, as written by `medrisk init`
pub fn generate_config() -> String {
    let defaults = MedRiskConfig::default();
    let t = defaults.risk;

    let mut out = String::new();
    out.push_str("# Input sources, relative to this file\n");
    out.push_str("[sources]\n");
    out.push_str("# cancer statistics (cancer_name, avg_days, patient_count, cost_per_patient)\n");
    out.push_str(&format!(
        "cancer_stats = \"{}\"\n",
        defaults.sources.cancer_stats.display()
    ));
    out.push_str("# income statistics, loaded as-is\n");
    out.push_str(&format!(
        "income_stats = \"{}\"\n",
        defaults.sources.income_stats.display()
    ));
    out.push_str("# hospital_type with cost_per_visit or a precomputed correction_factor\n");
    out.push_str(&format!(
        "hospital_costs = \"{}\"\n",
        defaults.sources.hospital_costs.display()
    ));
    out.push_str(&format!(
        "insurance_feed = \"{}\"\n",
        defaults.sources.insurance_feed.display()
    ));
    out.push_str("\n# XGBoost JSON booster or linear weights\n");
    out.push_str("[model]\n");
    out.push_str(&format!("path = \"{}\"\n", defaults.model.path.display()));
    out.push_str("\n[history]\n");
    out.push_str(&format!("path = \"{}\"\n", defaults.history.path.display()));
    out.push_str("\n[insurance]\n");
    out.push_str("# keep insurers whose name contains this token; \"\" keeps all\n");
    out.push_str(&format!(
        "name_keyword = \"{}\"\n",
        defaults.insurance.name_keyword
    ));
    out.push_str("\n# Inclusive upper burden-ratio bounds; above `high` is very high\n");
    out.push_str("[risk]\n");
    out.push_str(&format!("very_low = {:?}\n", t.very_low));
    out.push_str(&format!("low = {:?}\n", t.low));
    out.push_str(&format!("moderate = {:?}\n", t.moderate));
    out.push_str(&format!("high = {:?}\n", t.high));
    out
}
