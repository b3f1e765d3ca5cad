//! Cost prediction and burden-ratio risk rating.
//!
//! One call runs the whole chain: model inference on the feature row,
//! hospital-type correction, rounding to whole currency units, burden ratio
//! against annual income, and classification into a [`RiskLevel`]. A
//! successful prediction is appended to the risk history when a sink is
//! attached.

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};

use medrisk_data::CorrectionTable;
use medrisk_model::{ExplainabilityContext, ModelBackend, ModelError};

use crate::error::PredictError;
use crate::history::{HistorySink, RiskHistoryRecord};
use crate::input::{AgeGroup, Region, UserInput};
use crate::risk::{RiskLevel, RiskThresholds};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub cancer_name: String,
    /// Raw model output before correction
    pub base_cost: f64,
    pub correction_factor: f64,
    /// `base_cost * correction_factor`, rounded half to even
    pub corrected_cost: u64,
    /// `corrected_cost / annual_income`, unrounded
    pub burden_ratio: f64,
    /// Burden ratio as a percentage with two decimals
    pub burden_ratio_pct: f64,
    pub risk_level: RiskLevel,
    pub gauge_score: u8,
    pub age_group: AgeGroup,
    pub region: Region,
    pub hospital_type: String,
    pub annual_income: f64,
}

/// A prediction together with what presentation code needs around it
#[derive(Debug, Clone)]
pub struct Prediction {
    pub result: PredictionResult,
    pub explain: ExplainabilityContext,
    /// False when a history sink is attached and the append failed
    pub history_recorded: bool,
}

pub struct Predictor {
    model: Arc<dyn ModelBackend>,
    corrections: CorrectionTable,
    thresholds: RiskThresholds,
    history: Option<Box<dyn HistorySink>>,
}

impl fmt::Debug for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predictor")
            .field("model", &self.model.backend_type())
            .field("hospital_types", &self.corrections.len())
            .field("thresholds", &self.thresholds)
            .field("history", &self.history.is_some())
            .finish()
    }
}

impl Predictor {
    pub fn new(
        model: Arc<dyn ModelBackend>,
        corrections: CorrectionTable,
        thresholds: RiskThresholds,
    ) -> Self {
        Self {
            model,
            corrections,
            thresholds,
            history: None,
        }
    }

    /// Attach a sink that receives one record per successful prediction
    pub fn with_history(mut self, sink: Box<dyn HistorySink>) -> Self {
        self.history = Some(sink);
        self
    }

    pub fn model(&self) -> &Arc<dyn ModelBackend> {
        &self.model
    }

    pub fn corrections(&self) -> &CorrectionTable {
        &self.corrections
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn predict(&self, input: &UserInput) -> Result<Prediction, PredictError> {
        input.validate()?;
        let correction_factor = self
            .corrections
            .factor(&input.hospital_type)
            .ok_or_else(|| PredictError::UnknownHospitalType(input.hospital_type.clone()))?;

        let features = input.features();
        let row = features.to_row();
        let raw = self
            .model
            .predict(&row)
            .map_err(|source| PredictError::Model { row, source })?;
        if !raw.is_finite() {
            return Err(PredictError::Model {
                row,
                source: ModelError::Inference(format!("model returned {raw}")),
            });
        }
        let base_cost = if raw < 0.0 {
            log::warn!("cost model returned negative cost {raw} for {row:?}, clamping to 0");
            0.0
        } else {
            raw
        };

        let corrected_cost = (base_cost * correction_factor).round_ties_even() as u64;
        let burden_ratio = corrected_cost as f64 / input.annual_income;
        let risk_level = self.thresholds.classify(burden_ratio);
        let burden_ratio_pct = (burden_ratio * 10_000.0).round_ties_even() / 100.0;

        log::debug!(
            "{}: base {base_cost:.0} x {correction_factor} = {corrected_cost}, ratio {burden_ratio:.4} -> {risk_level}",
            input.cancer_name
        );

        let result = PredictionResult {
            cancer_name: input.cancer_name.clone(),
            base_cost,
            correction_factor,
            corrected_cost,
            burden_ratio,
            burden_ratio_pct,
            risk_level,
            gauge_score: risk_level.gauge_score(),
            age_group: input.age_group,
            region: input.region,
            hospital_type: input.hospital_type.clone(),
            annual_income: input.annual_income,
        };
        let history_recorded = self.record(&result);

        Ok(Prediction {
            result,
            explain: ExplainabilityContext::new(Arc::clone(&self.model), features),
            history_recorded,
        })
    }

    fn record(&self, result: &PredictionResult) -> bool {
        let Some(sink) = self.history.as_ref() else {
            return true;
        };
        let record = RiskHistoryRecord {
            timestamp: Local::now(),
            region: result.region,
            age_group: result.age_group,
            risk_score: result.gauge_score,
        };
        match sink.append(&record) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("risk history not recorded: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrisk_model::LinearBackend;

    fn predictor(bias: f64, factor: f64) -> Predictor {
        let corrections = CorrectionTable::from_factors([("general", factor)]).unwrap();
        Predictor::new(
            Arc::new(LinearBackend::new(vec![0.0; 4], bias)),
            corrections,
            RiskThresholds::default(),
        )
    }

    #[test]
    fn corrected_cost_rounds_half_to_even() {
        let p = predictor(1_000.5, 1.0);
        let input = UserInput::new(AgeGroup::Thirties, "general", 1_000_000.0);
        assert_eq!(p.predict(&input).unwrap().result.corrected_cost, 1_000);

        let p = predictor(1_001.5, 1.0);
        assert_eq!(p.predict(&input).unwrap().result.corrected_cost, 1_002);
    }

    #[test]
    fn negative_model_output_clamped() {
        let p = predictor(-50.0, 1.3);
        let input = UserInput::new(AgeGroup::Forties, "general", 10.0);
        let r = p.predict(&input).unwrap().result;
        assert_eq!(r.base_cost, 0.0);
        assert_eq!(r.corrected_cost, 0);
        assert_eq!(r.risk_level, RiskLevel::VeryLow);
    }

    #[test]
    fn non_finite_model_output_is_an_error() {
        let p = predictor(f64::NAN, 1.0);
        let input = UserInput::new(AgeGroup::Forties, "general", 10.0);
        assert!(matches!(
            p.predict(&input),
            Err(PredictError::Model {
                source: ModelError::Inference(_),
                ..
            })
        ));
    }

    #[test]
    fn income_checked_before_lookup() {
        let p = predictor(1.0, 1.0);
        let input = UserInput::new(AgeGroup::Forties, "nowhere", 0.0);
        assert!(matches!(p.predict(&input), Err(PredictError::InvalidIncome(_))));
    }

    #[test]
    fn percentage_has_two_decimals() {
        let p = predictor(123_457.0, 1.0);
        let input = UserInput::new(AgeGroup::Fifties, "general", 1_000_000.0);
        let r = p.predict(&input).unwrap().result;
        assert_eq!(r.burden_ratio, 0.123457);
        assert_eq!(r.burden_ratio_pct, 12.35);
        assert_eq!(r.risk_level, RiskLevel::Moderate);
        assert_eq!(r.gauge_score, 50);
    }
}
