use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use medrisk_data::CancerProfile;
use medrisk_model::FeatureVector;

use crate::error::PredictError;

pub const UNSPECIFIED_CANCER: &str = "unspecified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "20s")]
    Twenties,
    #[serde(rename = "30s")]
    Thirties,
    #[serde(rename = "40s")]
    Forties,
    #[serde(rename = "50s")]
    Fifties,
    #[serde(rename = "60+")]
    SixtiesPlus,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Twenties,
        AgeGroup::Thirties,
        AgeGroup::Forties,
        AgeGroup::Fifties,
        AgeGroup::SixtiesPlus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Twenties => "20s",
            AgeGroup::Thirties => "30s",
            AgeGroup::Forties => "40s",
            AgeGroup::Fifties => "50s",
            AgeGroup::SixtiesPlus => "60+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "20s" | "20대" => Ok(AgeGroup::Twenties),
            "30s" | "30대" => Ok(AgeGroup::Thirties),
            "40s" | "40대" => Ok(AgeGroup::Forties),
            "50s" | "50대" => Ok(AgeGroup::Fifties),
            "60+" | "60s" | "60대이상" | "60대 이상" => Ok(AgeGroup::SixtiesPlus),
            other => Err(PredictError::InvalidInput(format!(
                "unknown age group '{other}' (expected 20s, 30s, 40s, 50s or 60+)"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Seoul,
    Gyeonggi,
    Incheon,
    Busan,
    #[default]
    Other,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Seoul,
        Region::Gyeonggi,
        Region::Incheon,
        Region::Busan,
        Region::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Region::Seoul => "seoul",
            Region::Gyeonggi => "gyeonggi",
            Region::Incheon => "incheon",
            Region::Busan => "busan",
            Region::Other => "other",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seoul" | "서울" => Ok(Region::Seoul),
            "gyeonggi" | "경기" => Ok(Region::Gyeonggi),
            "incheon" | "인천" => Ok(Region::Incheon),
            "busan" | "부산" => Ok(Region::Busan),
            "other" | "기타" => Ok(Region::Other),
            other => Err(PredictError::InvalidInput(format!("unknown region '{other}'"))),
        }
    }
}

/// Everything one prediction call needs from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    pub age_group: AgeGroup,
    /// Average inpatient days for the cancer type
    pub avg_days: f64,
    pub is_inpatient: bool,
    /// Historical patient count for the cancer type
    pub patient_count: u64,
    pub hospital_type: String,
    pub annual_income: f64,
    pub cancer_name: String,
    pub region: Region,
    pub family_history: bool,
}

impl UserInput {
    /// Input with the default cancer profile; refine with the `with_*` builders
    pub fn new(age_group: AgeGroup, hospital_type: impl Into<String>, annual_income: f64) -> Self {
        let fallback = CancerProfile::fallback(UNSPECIFIED_CANCER);
        Self {
            age_group,
            avg_days: fallback.avg_days,
            is_inpatient: false,
            patient_count: fallback.patient_count,
            hospital_type: hospital_type.into(),
            annual_income,
            cancer_name: UNSPECIFIED_CANCER.to_string(),
            region: Region::default(),
            family_history: false,
        }
    }

    /// Take cancer name, average stay and patient volume from a profile
    pub fn with_profile(mut self, profile: &CancerProfile) -> Self {
        self.cancer_name = profile.name.clone();
        self.avg_days = profile.avg_days;
        self.patient_count = profile.patient_count;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_inpatient(mut self, is_inpatient: bool) -> Self {
        self.is_inpatient = is_inpatient;
        self
    }

    pub fn with_family_history(mut self, family_history: bool) -> Self {
        self.family_history = family_history;
        self
    }

    pub fn with_avg_days(mut self, avg_days: f64) -> Self {
        self.avg_days = avg_days;
        self
    }

    pub fn with_patient_count(mut self, patient_count: u64) -> Self {
        self.patient_count = patient_count;
        self
    }

    pub fn validate(&self) -> Result<(), PredictError> {
        if !(self.annual_income.is_finite() && self.annual_income > 0.0) {
            return Err(PredictError::InvalidIncome(self.annual_income));
        }
        if !(self.avg_days.is_finite() && self.avg_days >= 0.0) {
            return Err(PredictError::InvalidInput(format!(
                "average inpatient days must be a non-negative number, got {}",
                self.avg_days
            )));
        }
        Ok(())
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            avg_days: self.avg_days,
            is_inpatient: self.is_inpatient,
            patient_count: self.patient_count,
            family_history: self.family_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_in_both_languages() {
        assert_eq!("40대".parse::<AgeGroup>().unwrap(), AgeGroup::Forties);
        assert_eq!("60+".parse::<AgeGroup>().unwrap(), AgeGroup::SixtiesPlus);
        assert_eq!("60대이상".parse::<AgeGroup>().unwrap(), AgeGroup::SixtiesPlus);
        assert_eq!("서울".parse::<Region>().unwrap(), Region::Seoul);
        assert_eq!("Busan".parse::<Region>().unwrap(), Region::Busan);
        assert!("10s".parse::<AgeGroup>().is_err());
        assert!("jeju".parse::<Region>().is_err());
    }

    #[test]
    fn non_positive_income_rejected() {
        for income in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let input = UserInput::new(AgeGroup::Thirties, "clinic", income);
            assert!(matches!(input.validate(), Err(PredictError::InvalidIncome(_))));
        }
    }

    #[test]
    fn negative_days_rejected() {
        let input = UserInput::new(AgeGroup::Thirties, "clinic", 1.0).with_avg_days(-2.0);
        assert!(matches!(input.validate(), Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn profile_fills_features() {
        let profile = CancerProfile {
            name: "lung".into(),
            avg_days: 14.0,
            patient_count: 18_000,
            cost_per_patient: 3_500_000.0,
            is_default: false,
        };
        let input = UserInput::new(AgeGroup::Fifties, "general", 40_000_000.0)
            .with_profile(&profile)
            .with_inpatient(true);
        assert_eq!(input.cancer_name, "lung");
        assert_eq!(input.features().to_row(), [14.0, 1.0, 18_000.0, 0.0]);
    }
}
