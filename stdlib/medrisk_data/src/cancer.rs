use serde::{Deserialize, Serialize};

use crate::columns::{AVG_DAYS, CANCER_NAME, COST_PER_PATIENT, PATIENT_COUNT};
use crate::error::DataError;
use crate::table::Table;

pub const DEFAULT_AVG_DAYS: f64 = 7.0;
pub const DEFAULT_PATIENT_COUNT: u64 = 4000;
pub const DEFAULT_COST_PER_PATIENT: f64 = 1_000_000.0;

/// Per-cancer-type statistics used to fill the model's feature row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancerProfile {
    pub name: String,
    /// Average inpatient days per patient
    pub avg_days: f64,
    /// Historical patient count for this cancer type
    pub patient_count: u64,
    pub cost_per_patient: f64,
    /// True when the name was not found and defaults were substituted
    pub is_default: bool,
}

impl CancerProfile {
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            avg_days: DEFAULT_AVG_DAYS,
            patient_count: DEFAULT_PATIENT_COUNT,
            cost_per_patient: DEFAULT_COST_PER_PATIENT,
            is_default: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancerStats {
    profiles: Vec<CancerProfile>,
}

impl CancerStats {
    pub fn new(profiles: Vec<CancerProfile>) -> Self {
        Self { profiles }
    }

    /// Read profiles from a normalized cancer statistics table.
    ///
    /// Only the name column is required; missing or blank numeric cells fall
    /// back to the per-field defaults. Repeated names keep the first row.
    pub fn from_table(table: &Table) -> Result<Self, DataError> {
        let name_col = table.require_column(CANCER_NAME)?;
        let days_col = table.column_index(AVG_DAYS);
        let count_col = table.column_index(PATIENT_COUNT);
        let cost_col = table.column_index(COST_PER_PATIENT);

        let mut profiles: Vec<CancerProfile> = Vec::new();
        for i in 0..table.len() {
            let name = table.cell(i, name_col);
            if name.is_empty() || profiles.iter().any(|p| p.name == name) {
                continue;
            }
            let avg_days = days_col
                .and_then(|c| table.number(i, c))
                .filter(|d| *d >= 0.0)
                .unwrap_or(DEFAULT_AVG_DAYS);
            let patient_count = count_col
                .and_then(|c| table.number(i, c))
                .filter(|n| *n >= 0.0)
                .map(|n| n as u64)
                .unwrap_or(DEFAULT_PATIENT_COUNT);
            let cost_per_patient = cost_col
                .and_then(|c| table.number(i, c))
                .unwrap_or(DEFAULT_COST_PER_PATIENT);
            profiles.push(CancerProfile {
                name: name.to_string(),
                avg_days,
                patient_count,
                cost_per_patient,
                is_default: false,
            });
        }
        log::info!("loaded {} cancer profiles from {}", profiles.len(), table.origin());
        Ok(Self { profiles })
    }

    /// Profile for a cancer type, or the default profile when unknown
    pub fn profile(&self, name: &str) -> CancerProfile {
        let name = name.trim();
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .unwrap_or_else(|| {
                log::debug!("no statistics for cancer type '{name}', using defaults");
                CancerProfile::fallback(name)
            })
    }

    pub fn cancer_types(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
