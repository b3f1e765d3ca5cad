//! Medical cost prediction, financial risk rating and insurer recommendation.
//!
//! [`Predictor`] turns a [`UserInput`] into a corrected cost estimate and a
//! [`RiskLevel`]; [`recommend`] ranks insurers eligible for that level.
//! [`RiskEngine`] wires both up from a `medrisk.toml` config.
//!
//! ```
//! use medrisk_engine::{classify_burden, RiskLevel};
//! assert_eq!(classify_burden(0.05), RiskLevel::VeryLow);
//! assert_eq!(classify_burden(0.31), RiskLevel::VeryHigh);
//! assert_eq!(RiskLevel::High.gauge_score(), 75);
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod predictor;
pub mod recommend;
pub mod risk;

use std::path::Path;

use medrisk_data::{load_data_sources, CancerStats, InsuranceCompany, Table};
use medrisk_model::load_cost_model;

pub use config::{generate_config, parse_config, MedRiskConfig, CONFIG_FILE};
pub use error::{ConfigError, HistoryError, LoadError, PredictError};
pub use history::{CsvHistoryLog, HeatmapCell, HistorySink, RiskHistory, RiskHistoryRecord};
pub use input::{AgeGroup, Region, UserInput, UNSPECIFIED_CANCER};
pub use predictor::{Prediction, PredictionResult, Predictor};
pub use recommend::{recommend, recommend_for_label, RecommendationFilter};
pub use risk::{classify_burden, RiskLevel, RiskThresholds};

/// All sources, the cost model and the history log, loaded once at startup
#[derive(Debug)]
pub struct RiskEngine {
    config: MedRiskConfig,
    predictor: Predictor,
    cancer_stats: CancerStats,
    income_stats: Table,
    companies: Vec<InsuranceCompany>,
}

impl RiskEngine {
    pub fn load(config_path: &Path) -> Result<Self, LoadError> {
        let config = config::load(config_path)?;
        Self::from_config(config)
    }

    /// Paths in `config` are used as given
    pub fn from_config(config: MedRiskConfig) -> Result<Self, LoadError> {
        let sources = load_data_sources(&config.sources, &config.feed_options())?;
        let model = load_cost_model(&config.model.path)?;
        let predictor = Predictor::new(model, sources.corrections, config.risk)
            .with_history(Box::new(CsvHistoryLog::new(&config.history.path)));
        log::info!(
            "engine ready: {} cancer types, {} hospital types, {} insurers",
            sources.cancer_stats.len(),
            predictor.corrections().len(),
            sources.companies.len()
        );
        Ok(Self {
            config,
            predictor,
            cancer_stats: sources.cancer_stats,
            income_stats: sources.income_stats,
            companies: sources.companies,
        })
    }

    pub fn config(&self) -> &MedRiskConfig {
        &self.config
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn cancer_stats(&self) -> &CancerStats {
        &self.cancer_stats
    }

    pub fn income_stats(&self) -> &Table {
        &self.income_stats
    }

    pub fn companies(&self) -> &[InsuranceCompany] {
        &self.companies
    }

    pub fn predict(&self, input: &UserInput) -> Result<Prediction, PredictError> {
        self.predictor.predict(input)
    }

    pub fn recommend(&self, level: RiskLevel) -> Vec<InsuranceCompany> {
        recommend(level, &self.companies)
    }

    pub fn history(&self) -> Result<RiskHistory, HistoryError> {
        RiskHistory::load(&self.config.history.path)
    }
}
