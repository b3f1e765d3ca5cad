//! Financial risk levels derived from the burden ratio (cost / income).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use medrisk_data::SizeBucket;

use crate::error::{ConfigError, PredictError};

/// Ordinal risk level, `VeryLow < ... < VeryHigh`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::VeryLow,
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    /// Fixed display score for the risk gauge
    pub fn gauge_score(&self) -> u8 {
        match self {
            RiskLevel::VeryLow => 10,
            RiskLevel::Low => 25,
            RiskLevel::Moderate => 50,
            RiskLevel::High => 75,
            RiskLevel::VeryHigh => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "very low",
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very high",
        }
    }

    pub fn korean_label(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "매우 낮음",
            RiskLevel::Low => "낮음",
            RiskLevel::Moderate => "보통",
            RiskLevel::High => "높음",
            RiskLevel::VeryHigh => "매우 높음",
        }
    }

    /// Insurer size buckets a patient at this level is matched with
    pub fn eligible_buckets(&self) -> &'static [SizeBucket] {
        match self {
            RiskLevel::VeryLow | RiskLevel::Low => &[SizeBucket::Small, SizeBucket::Medium],
            RiskLevel::Moderate | RiskLevel::High => &[SizeBucket::Medium, SizeBucket::Large],
            RiskLevel::VeryHigh => &[SizeBucket::Large],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = PredictError;

    /// Accepts English labels in any case with spaces, `_` or `-`, the
    /// variant names, and the Korean labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(level) = RiskLevel::ALL
            .into_iter()
            .find(|l| l.korean_label() == trimmed)
        {
            return Ok(level);
        }
        let key: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "verylow" => Ok(RiskLevel::VeryLow),
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            "veryhigh" => Ok(RiskLevel::VeryHigh),
            _ => Err(PredictError::UnknownRiskLevel(trimmed.to_string())),
        }
    }
}

/// Inclusive upper burden-ratio bounds for the first four levels; anything
/// above `high` is [`RiskLevel::VeryHigh`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub very_low: f64,
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            very_low: 0.05,
            low: 0.10,
            moderate: 0.20,
            high: 0.30,
        }
    }
}

impl RiskThresholds {
    pub fn new(very_low: f64, low: f64, moderate: f64, high: f64) -> Result<Self, ConfigError> {
        let t = Self {
            very_low,
            low,
            moderate,
            high,
        };
        t.validate()?;
        Ok(t)
    }

    /// Bounds must be finite, positive and strictly increasing
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [self.very_low, self.low, self.moderate, self.high];
        if bounds.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(ConfigError::InvalidThresholds(format!(
                "bounds must be finite and positive, got {bounds:?}"
            )));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::InvalidThresholds(format!(
                "bounds must be strictly increasing, got {bounds:?}"
            )));
        }
        Ok(())
    }

    pub fn classify(&self, burden_ratio: f64) -> RiskLevel {
        if burden_ratio <= self.very_low {
            RiskLevel::VeryLow
        } else if burden_ratio <= self.low {
            RiskLevel::Low
        } else if burden_ratio <= self.moderate {
            RiskLevel::Moderate
        } else if burden_ratio <= self.high {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }
}

/// Classify with the default thresholds
pub fn classify_burden(burden_ratio: f64) -> RiskLevel {
    RiskThresholds::default().classify(burden_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_upper_bounds() {
        assert_eq!(classify_burden(0.0), RiskLevel::VeryLow);
        assert_eq!(classify_burden(0.05), RiskLevel::VeryLow);
        assert_eq!(classify_burden(0.050001), RiskLevel::Low);
        assert_eq!(classify_burden(0.10), RiskLevel::Low);
        assert_eq!(classify_burden(0.20), RiskLevel::Moderate);
        assert_eq!(classify_burden(0.30), RiskLevel::High);
        assert_eq!(classify_burden(0.3000001), RiskLevel::VeryHigh);
        assert_eq!(classify_burden(12.0), RiskLevel::VeryHigh);
    }

    #[test]
    fn gauge_scores() {
        let scores: Vec<u8> = RiskLevel::ALL.iter().map(|l| l.gauge_score()).collect();
        assert_eq!(scores, vec![10, 25, 50, 75, 90]);
    }

    #[test]
    fn parse_labels() {
        assert_eq!("very high".parse::<RiskLevel>().unwrap(), RiskLevel::VeryHigh);
        assert_eq!("VeryLow".parse::<RiskLevel>().unwrap(), RiskLevel::VeryLow);
        assert_eq!("very_low".parse::<RiskLevel>().unwrap(), RiskLevel::VeryLow);
        assert_eq!("보통".parse::<RiskLevel>().unwrap(), RiskLevel::Moderate);
        assert_eq!("매우 높음".parse::<RiskLevel>().unwrap(), RiskLevel::VeryHigh);
        let err = "Unknown".parse::<RiskLevel>().unwrap_err();
        assert!(matches!(err, PredictError::UnknownRiskLevel(ref s) if s == "Unknown"));
    }

    #[test]
    fn invalid_thresholds_rejected() {
        assert!(RiskThresholds::new(0.1, 0.05, 0.2, 0.3).is_err());
        assert!(RiskThresholds::new(0.0, 0.05, 0.2, 0.3).is_err());
        assert!(RiskThresholds::new(0.05, 0.1, 0.2, f64::INFINITY).is_err());
        assert!(RiskThresholds::new(0.02, 0.04, 0.08, 0.16).is_ok());
        assert!(RiskThresholds::default().validate().is_ok());
    }
}
