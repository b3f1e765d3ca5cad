//! Hospital-type cost correction.
//!
//! A correction factor captures how a hospital type's typical per-visit cost
//! deviates from the cross-type mean:
//!
//! `factor(h) = mean(cost_per_visit | type = h) / mean(cost_per_visit | all types)`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::columns::{COST_PER_VISIT, CORRECTION_FACTOR, HOSPITAL_TYPE};
use crate::error::DataError;
use crate::table::Table;

/// One row of the hospital cost source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalCostRow {
    pub hospital_type: String,
    pub cost_per_visit: Option<f64>,
    pub correction_factor: Option<f64>,
}

impl HospitalCostRow {
    pub fn new(hospital_type: impl Into<String>, cost_per_visit: Option<f64>) -> Self {
        Self {
            hospital_type: hospital_type.into(),
            cost_per_visit,
            correction_factor: None,
        }
    }
}

/// Extract hospital cost rows from a normalized table.
///
/// Requires the hospital type column plus either the per-visit cost column or
/// a precomputed correction factor column. Rows without a type are dropped.
pub fn hospital_cost_rows(table: &Table) -> Result<Vec<HospitalCostRow>, DataError> {
    let type_col = table.require_column(HOSPITAL_TYPE)?;
    let cost_col = table.column_index(COST_PER_VISIT);
    let factor_col = table.column_index(CORRECTION_FACTOR);
    if cost_col.is_none() && factor_col.is_none() {
        return Err(DataError::MissingColumn {
            column: COST_PER_VISIT.to_string(),
            origin: table.origin().to_string(),
        });
    }

    let mut rows = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        let hospital_type = table.cell(i, type_col);
        if hospital_type.is_empty() {
            log::debug!("{}: row {i} has no hospital type, skipped", table.origin());
            continue;
        }
        rows.push(HospitalCostRow {
            hospital_type: hospital_type.to_string(),
            cost_per_visit: cost_col.and_then(|c| table.number(i, c)),
            correction_factor: factor_col.and_then(|c| table.number(i, c)),
        });
    }
    Ok(rows)
}

/// Hospital type -> strictly positive correction factor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionTable {
    factors: BTreeMap<String, f64>,
}

impl CorrectionTable {
    /// Build from explicit factors, rejecting non-positive or non-finite values.
    pub fn from_factors<I, K>(factors: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut out = BTreeMap::new();
        for (k, f) in factors {
            let k = k.into();
            check_factor(&k, f)?;
            out.insert(k, f);
        }
        Ok(Self { factors: out })
    }

    /// Use the precomputed `correction_factor` column; first row per type wins.
    pub fn from_precomputed(rows: &[HospitalCostRow]) -> Result<Self, DataError> {
        let mut out = BTreeMap::new();
        for row in rows {
            if out.contains_key(&row.hospital_type) {
                continue;
            }
            let Some(f) = row.correction_factor else {
                continue;
            };
            check_factor(&row.hospital_type, f)?;
            out.insert(row.hospital_type.clone(), f);
        }
        if out.is_empty() {
            return Err(DataError::DataIntegrity(
                "correction factor column has no numeric values".into(),
            ));
        }
        Ok(Self { factors: out })
    }

    pub fn factor(&self, hospital_type: &str) -> Option<f64> {
        self.factors.get(hospital_type).copied()
    }

    pub fn hospital_types(&self) -> impl Iterator<Item = &str> {
        self.factors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.factors.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

fn check_factor(hospital_type: &str, f: f64) -> Result<(), DataError> {
    if f.is_finite() && f > 0.0 {
        Ok(())
    } else {
        Err(DataError::DataIntegrity(format!(
            "correction factor {f} for hospital type '{hospital_type}' is not strictly positive"
        )))
    }
}

/// Compute correction factors from per-visit costs.
///
/// Missing costs are skipped in every mean. A hospital type whose costs are
/// all missing is left out of the table, so looking it up fails later rather
/// than silently defaulting.
pub fn build_correction_table(rows: &[HospitalCostRow]) -> Result<CorrectionTable, DataError> {
    let mut total = 0.0_f64;
    let mut count = 0_usize;
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for row in rows {
        let group = groups.entry(row.hospital_type.as_str()).or_insert((0.0, 0));
        if let Some(cost) = row.cost_per_visit {
            total += cost;
            count += 1;
            group.0 += cost;
            group.1 += 1;
        }
    }

    if count == 0 {
        return Err(DataError::DataIntegrity(
            "cost per visit column has no numeric values".into(),
        ));
    }
    let overall = total / count as f64;
    if overall <= 0.0 {
        return Err(DataError::DataIntegrity(format!(
            "mean cost per visit is {overall}; correction factors would be undefined"
        )));
    }

    let mut factors = BTreeMap::new();
    for (hospital_type, (sum, n)) in groups {
        if n == 0 {
            log::warn!("hospital type '{hospital_type}' has no numeric costs, left out of correction table");
            continue;
        }
        let mean = sum / n as f64;
        let factor = mean / overall;
        check_factor(hospital_type, factor)?;
        factors.insert(hospital_type.to_string(), factor);
    }

    log::info!(
        "built correction table for {} hospital types (mean cost per visit {overall:.1})",
        factors.len()
    );
    Ok(CorrectionTable { factors })
}

/// Load the correction table from a normalized hospital cost table, using a
/// precomputed factor column when the source carries one.
pub fn correction_table_from(table: &Table) -> Result<CorrectionTable, DataError> {
    let rows = hospital_cost_rows(table)?;
    if table.column_index(CORRECTION_FACTOR).is_some() {
        log::debug!("{}: using precomputed correction factors", table.origin());
        CorrectionTable::from_precomputed(&rows)
    } else {
        build_correction_table(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(t: &str, c: f64) -> HospitalCostRow {
        HospitalCostRow::new(t, Some(c))
    }

    #[test]
    fn factors_are_group_mean_over_overall_mean() {
        let rows = vec![row("general", 300.0), row("general", 100.0), row("clinic", 50.0)];
        // overall mean = 150, general mean = 200, clinic mean = 50
        let table = build_correction_table(&rows).unwrap();
        assert!((table.factor("general").unwrap() - 200.0 / 150.0).abs() < 1e-12);
        assert!((table.factor("clinic").unwrap() - 50.0 / 150.0).abs() < 1e-12);
        assert_eq!(table.factor("tertiary"), None);
    }

    #[test]
    fn zero_mean_is_integrity_error() {
        let rows = vec![row("a", 0.0), row("b", 0.0)];
        assert!(matches!(
            build_correction_table(&rows),
            Err(DataError::DataIntegrity(_))
        ));
    }

    #[test]
    fn all_missing_costs_is_integrity_error() {
        let rows = vec![HospitalCostRow::new("a", None)];
        assert!(matches!(
            build_correction_table(&rows),
            Err(DataError::DataIntegrity(_))
        ));
    }

    #[test]
    fn type_without_costs_is_left_out() {
        let rows = vec![row("a", 10.0), HospitalCostRow::new("b", None)];
        let table = build_correction_table(&rows).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.factor("b"), None);
    }

    #[test]
    fn precomputed_first_row_wins() {
        let mut a1 = row("a", 1.0);
        a1.correction_factor = Some(1.2);
        let mut a2 = row("a", 1.0);
        a2.correction_factor = Some(0.8);
        let table = CorrectionTable::from_precomputed(&[a1, a2]).unwrap();
        assert_eq!(table.factor("a"), Some(1.2));
    }

    #[test]
    fn explicit_factors_must_be_positive() {
        assert!(CorrectionTable::from_factors([("a", 0.0)]).is_err());
        assert!(CorrectionTable::from_factors([("a", f64::NAN)]).is_err());
        let t = CorrectionTable::from_factors([("a", 1.1)]).unwrap();
        assert_eq!(t.factor("a"), Some(1.1));
    }
}
