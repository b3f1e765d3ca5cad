//! Insurer recommendation by risk level.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use medrisk_data::InsuranceCompany;

use crate::error::PredictError;
use crate::risk::RiskLevel;

/// Companies whose size bucket is eligible for `level`, ranked by mobile
/// enrollment, then size, then enrollment (all descending). Ties keep their
/// input order. No eligible company yields an empty list.
pub fn recommend(level: RiskLevel, companies: &[InsuranceCompany]) -> Vec<InsuranceCompany> {
    let buckets = level.eligible_buckets();
    let mut out: Vec<InsuranceCompany> = companies
        .iter()
        .filter(|c| buckets.contains(&c.size))
        .cloned()
        .collect();
    out.sort_by_key(|c| Reverse((c.mobile_enrollment, c.size, c.enrollment)));
    log::debug!(
        "{} of {} insurers eligible at {level} risk",
        out.len(),
        companies.len()
    );
    out
}

/// [`recommend`] for a free-form label, e.g. from a form field
pub fn recommend_for_label(
    label: &str,
    companies: &[InsuranceCompany],
) -> Result<Vec<InsuranceCompany>, PredictError> {
    let level: RiskLevel = label.parse()?;
    Ok(recommend(level, companies))
}

/// Narrowing applied after ranking; unset fields accept everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationFilter {
    pub coverage_type: Option<String>,
    pub price_tier: Option<String>,
    pub mobile_only: bool,
}

impl RecommendationFilter {
    pub fn matches(&self, company: &InsuranceCompany) -> bool {
        if let Some(coverage) = &self.coverage_type {
            if &company.coverage_type != coverage {
                return false;
            }
        }
        if let Some(tier) = &self.price_tier {
            if &company.price_tier != tier {
                return false;
            }
        }
        !self.mobile_only || company.mobile_enrollment
    }

    pub fn apply(&self, companies: Vec<InsuranceCompany>) -> Vec<InsuranceCompany> {
        companies.into_iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrisk_data::SizeBucket;
    use pretty_assertions::assert_eq;

    fn names(companies: &[InsuranceCompany]) -> Vec<&str> {
        companies.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn ranking_keys_in_order() {
        let companies = vec![
            InsuranceCompany::new("big-offline", 9000).with_mobile_enrollment(false),
            InsuranceCompany::new("mid-mobile", 1500),
            InsuranceCompany::new("big-mobile", 5000),
            InsuranceCompany::new("bigger-mobile", 7000),
            InsuranceCompany::new("small", 100),
        ];
        let out = recommend(RiskLevel::Moderate, &companies);
        assert_eq!(
            names(&out),
            vec!["bigger-mobile", "big-mobile", "mid-mobile", "big-offline"]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let companies = vec![
            InsuranceCompany::new("first", 1200),
            InsuranceCompany::new("second", 1200),
            InsuranceCompany::new("third", 1200),
        ];
        let out = recommend(RiskLevel::Low, &companies);
        assert_eq!(names(&out), vec!["first", "second", "third"]);
    }

    #[test]
    fn very_high_admits_only_large() {
        let companies = vec![
            InsuranceCompany::new("A", 500),
            InsuranceCompany::new("B", 4000).with_mobile_enrollment(false),
        ];
        let out = recommend(RiskLevel::VeryHigh, &companies);
        assert_eq!(names(&out), vec!["B"]);
        assert!(out.iter().all(|c| c.size == SizeBucket::Large));
    }

    #[test]
    fn no_eligible_company_is_empty_not_error() {
        let companies = vec![InsuranceCompany::new("tiny", 10)];
        assert!(recommend(RiskLevel::VeryHigh, &companies).is_empty());
        assert!(recommend_for_label("very high", &companies).unwrap().is_empty());
    }

    #[test]
    fn unknown_label_rejected() {
        let err = recommend_for_label("Unknown", &[]).unwrap_err();
        assert!(matches!(err, PredictError::UnknownRiskLevel(_)));
    }

    #[test]
    fn filter_preserves_order() {
        let companies = vec![
            InsuranceCompany::new("a", 5000).with_price_tier("높음"),
            InsuranceCompany::new("b", 4000),
            InsuranceCompany::new("c", 3500).with_mobile_enrollment(false),
            InsuranceCompany::new("d", 3200).with_coverage_type("종합"),
        ];
        let ranked = recommend(RiskLevel::VeryHigh, &companies);
        let filter = RecommendationFilter {
            coverage_type: Some("암 전용".into()),
            price_tier: Some("중간".into()),
            mobile_only: true,
        };
        assert_eq!(names(&filter.apply(ranked.clone())), vec!["b"]);
        assert_eq!(RecommendationFilter::default().apply(ranked.clone()), ranked);
    }
}
