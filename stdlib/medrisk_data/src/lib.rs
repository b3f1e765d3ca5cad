//! Data loading for the medrisk pipeline.
//!
//! Reads the tabular cancer statistics exports, the hospital cost table and
//! the insurer enrollment feed, and turns them into the lookup structures the
//! predictor and recommender consume:
//!
//! - [`CorrectionTable`]: hospital type -> cost correction factor
//! - [`CancerStats`]: cancer type -> average stay / patient volume profile
//! - [`InsuranceCompany`] list, each classified into a [`SizeBucket`]
//!
//! ```
//! use medrisk_data::{classify, SizeBucket};
//! assert_eq!(classify(999), SizeBucket::Small);
//! assert_eq!(classify(1000), SizeBucket::Medium);
//! assert_eq!(classify(3000), SizeBucket::Large);
//! ```

pub mod cancer;
pub mod columns;
pub mod error;
pub mod hospital;
pub mod insurance;
pub mod sources;
pub mod table;

pub use cancer::{CancerProfile, CancerStats};
pub use error::DataError;
pub use hospital::{
    build_correction_table, correction_table_from, hospital_cost_rows, CorrectionTable,
    HospitalCostRow,
};
pub use insurance::{
    classify, dedup_by_name, load_insurance_feed, parse_insurance_feed, FeedOptions,
    InsuranceCompany, SizeBucket,
};
pub use sources::{load_data_sources, DataSources, SourcePaths};
pub use table::Table;
