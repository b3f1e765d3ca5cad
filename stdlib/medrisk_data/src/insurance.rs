//! Insurer enrollment feed and company size classification.
//!
//! The feed is the public life-insurance statistics document:
//! `response.body.tableList[0].items.item[]`, each item carrying the company
//! name (`fncoNm`), an enrollment count (`xcsmPlnpnCnt`, string or number)
//! and a category label (`xcsmPlnpnDcdNm`).

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::DataError;

pub const LARGE_ENROLLMENT: u64 = 3000;
pub const MEDIUM_ENROLLMENT: u64 = 1000;

pub const DEFAULT_COVERAGE_TYPE: &str = "암 전용";
pub const DEFAULT_PRICE_TIER: &str = "중간";
pub const DEFAULT_MOBILE_ENROLLMENT: bool = true;
pub const DEFAULT_COMPLAINT_RATE: f64 = 1.2;

/// Coarse company size derived from enrollment count.
///
/// Ordered `Small < Medium < Large`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeBucket::Small => write!(f, "small"),
            SizeBucket::Medium => write!(f, "medium"),
            SizeBucket::Large => write!(f, "large"),
        }
    }
}

/// `>= 3000` Large, `>= 1000` Medium, otherwise Small.
pub fn classify(enrollment: u64) -> SizeBucket {
    if enrollment >= LARGE_ENROLLMENT {
        SizeBucket::Large
    } else if enrollment >= MEDIUM_ENROLLMENT {
        SizeBucket::Medium
    } else {
        SizeBucket::Small
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceCompany {
    pub name: String,
    pub enrollment: u64,
    pub category: Option<String>,
    pub size: SizeBucket,
    pub coverage_type: String,
    pub price_tier: String,
    pub mobile_enrollment: bool,
    pub complaint_rate: f64,
}

impl InsuranceCompany {
    /// A company with the default filterable attributes
    pub fn new(name: impl Into<String>, enrollment: u64) -> Self {
        Self {
            name: name.into(),
            enrollment,
            category: None,
            size: classify(enrollment),
            coverage_type: DEFAULT_COVERAGE_TYPE.to_string(),
            price_tier: DEFAULT_PRICE_TIER.to_string(),
            mobile_enrollment: DEFAULT_MOBILE_ENROLLMENT,
            complaint_rate: DEFAULT_COMPLAINT_RATE,
        }
    }

    pub fn with_mobile_enrollment(mut self, mobile: bool) -> Self {
        self.mobile_enrollment = mobile;
        self
    }

    pub fn with_coverage_type(mut self, coverage_type: impl Into<String>) -> Self {
        self.coverage_type = coverage_type.into();
        self
    }

    pub fn with_price_tier(mut self, price_tier: impl Into<String>) -> Self {
        self.price_tier = price_tier.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedOptions {
    /// Keep only companies whose name contains this token
    pub name_keyword: Option<String>,
}

#[derive(Deserialize)]
struct Feed {
    response: FeedResponse,
}

#[derive(Deserialize)]
struct FeedResponse {
    body: FeedBody,
}

#[derive(Deserialize)]
struct FeedBody {
    #[serde(rename = "tableList")]
    table_list: Vec<FeedTable>,
}

#[derive(Deserialize)]
struct FeedTable {
    items: FeedItems,
}

#[derive(Deserialize)]
struct FeedItems {
    item: OneOrMany<FeedItem>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

#[derive(Deserialize)]
struct FeedItem {
    #[serde(rename = "fncoNm")]
    name: Option<String>,
    #[serde(rename = "xcsmPlnpnCnt")]
    enrollment: Option<JsonValue>,
    #[serde(rename = "xcsmPlnpnDcdNm")]
    category: Option<String>,
    #[serde(rename = "coverageType")]
    coverage_type: Option<String>,
    #[serde(rename = "priceTier")]
    price_tier: Option<String>,
    #[serde(rename = "mobileEnrollment")]
    mobile_enrollment: Option<bool>,
    #[serde(rename = "complaintRate")]
    complaint_rate: Option<f64>,
}

/// Enrollment as a non-negative integer; anything unparseable counts as 0.
fn coerce_enrollment(value: Option<&JsonValue>) -> u64 {
    let n = match value {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(x) if x.is_finite() && x >= 0.0 => x as u64,
        _ => 0,
    }
}

/// Remove companies whose name was already seen; the first occurrence wins.
pub fn dedup_by_name(companies: Vec<InsuranceCompany>) -> Vec<InsuranceCompany> {
    let mut seen = HashSet::new();
    companies
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .collect()
}

/// Parse the insurer feed into classified, de-duplicated companies.
pub fn parse_insurance_feed(
    json: &str,
    options: &FeedOptions,
) -> Result<Vec<InsuranceCompany>, DataError> {
    let feed: Feed = serde_json::from_str(json)?;
    let table = feed
        .response
        .body
        .table_list
        .into_iter()
        .next()
        .ok_or_else(|| DataError::DataIntegrity("insurance feed has an empty tableList".into()))?;

    let mut companies = Vec::new();
    for item in table.items.item.into_vec() {
        let Some(name) = item.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) else {
            log::debug!("insurance feed item without a company name skipped");
            continue;
        };
        if let Some(keyword) = options.name_keyword.as_deref() {
            if !name.contains(keyword) {
                continue;
            }
        }
        let enrollment = coerce_enrollment(item.enrollment.as_ref());
        companies.push(InsuranceCompany {
            name,
            enrollment,
            category: item.category,
            size: classify(enrollment),
            coverage_type: item
                .coverage_type
                .unwrap_or_else(|| DEFAULT_COVERAGE_TYPE.to_string()),
            price_tier: item
                .price_tier
                .unwrap_or_else(|| DEFAULT_PRICE_TIER.to_string()),
            mobile_enrollment: item.mobile_enrollment.unwrap_or(DEFAULT_MOBILE_ENROLLMENT),
            complaint_rate: item.complaint_rate.unwrap_or(DEFAULT_COMPLAINT_RATE),
        });
    }

    let before = companies.len();
    let companies = dedup_by_name(companies);
    if companies.len() != before {
        log::debug!("dropped {} duplicate insurer records", before - companies.len());
    }
    Ok(companies)
}

pub fn load_insurance_feed(
    path: &Path,
    options: &FeedOptions,
) -> Result<Vec<InsuranceCompany>, DataError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        origin: path.display().to_string(),
        source,
    })?;
    let companies = parse_insurance_feed(&text, options)?;
    log::info!("loaded {} insurers from {}", companies.len(), path.display());
    Ok(companies)
}
