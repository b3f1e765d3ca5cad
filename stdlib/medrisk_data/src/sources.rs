use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cancer::CancerStats;
use crate::columns::{CANCER_COLUMNS, CANCER_NAME, HOSPITAL_COLUMNS, HOSPITAL_TYPE};
use crate::error::DataError;
use crate::hospital::{correction_table_from, CorrectionTable};
use crate::insurance::{load_insurance_feed, FeedOptions, InsuranceCompany};
use crate::table::Table;

/// Locations of the four input sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePaths {
    pub cancer_stats: PathBuf,
    pub income_stats: PathBuf,
    pub hospital_costs: PathBuf,
    pub insurance_feed: PathBuf,
}

/// Everything the predictor and recommender need, built once at startup
#[derive(Debug, Clone)]
pub struct DataSources {
    pub cancer_stats: CancerStats,
    pub income_stats: Table,
    pub corrections: CorrectionTable,
    pub companies: Vec<InsuranceCompany>,
}

pub fn load_data_sources(
    paths: &SourcePaths,
    feed: &FeedOptions,
) -> Result<DataSources, DataError> {
    let cancer_table = Table::from_path(&paths.cancer_stats, CANCER_COLUMNS, Some(CANCER_NAME))?;
    let cancer_stats = CancerStats::from_table(&cancer_table)?;

    let income_stats = Table::from_path(&paths.income_stats, &[], None)?;

    let hospital_table =
        Table::from_path(&paths.hospital_costs, HOSPITAL_COLUMNS, Some(HOSPITAL_TYPE))?;
    let corrections = correction_table_from(&hospital_table)?;

    let companies = load_insurance_feed(&paths.insurance_feed, feed)?;

    Ok(DataSources {
        cancer_stats,
        income_stats,
        corrections,
        companies,
    })
}
