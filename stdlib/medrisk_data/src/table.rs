use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::columns::{canonical_name, parse_number, ColumnAlias};
use crate::error::DataError;

/// Rows above the header that a sheet export may carry (titles, units)
const HEADER_SEARCH_ROWS: usize = 3;

/// A CSV export with normalized column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    origin: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a table from any reader.
    ///
    /// Header cells are mapped through `known`. When `header_hint` is given,
    /// the header is the first of the leading rows that contains that
    /// canonical column; otherwise the first row is the header.
    pub fn from_reader<R: Read>(
        reader: R,
        origin: &str,
        known: &[ColumnAlias],
        header_hint: Option<&str>,
    ) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for rec in rdr.records() {
            let rec = rec.map_err(|source| DataError::Csv {
                origin: origin.to_string(),
                source,
            })?;
            records.push(rec.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let header_idx = match header_hint {
            None => 0,
            Some(hint) => records
                .iter()
                .take(HEADER_SEARCH_ROWS)
                .position(|r| r.iter().any(|c| canonical_name(c, known) == hint))
                .ok_or_else(|| DataError::MissingColumn {
                    column: hint.to_string(),
                    origin: origin.to_string(),
                })?,
        };

        let Some(header) = records.get(header_idx) else {
            return Ok(Self {
                origin: origin.to_string(),
                ..Self::default()
            });
        };
        let columns: Vec<String> = header.iter().map(|c| canonical_name(c, known)).collect();

        let rows = records
            .into_iter()
            .skip(header_idx + 1)
            .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
            .collect();

        log::debug!(
            "loaded table {origin}: {} columns, header at row {header_idx}",
            columns.len()
        );
        Ok(Self {
            origin: origin.to_string(),
            columns,
            rows,
        })
    }

    pub fn from_path(
        path: &Path,
        known: &[ColumnAlias],
        header_hint: Option<&str>,
    ) -> Result<Self, DataError> {
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| DataError::Io {
            origin: origin.clone(),
            source,
        })?;
        Self::from_reader(file, &origin, known, header_hint)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column that must be present
    pub fn require_column(&self, name: &str) -> Result<usize, DataError> {
        self.column_index(name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                origin: self.origin.clone(),
            })
    }

    /// Trimmed cell text; short rows read as blank
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    pub fn number(&self, row: usize, col: usize) -> Option<f64> {
        parse_number(self.cell(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{CANCER_COLUMNS, CANCER_NAME, PATIENT_COUNT};

    #[test]
    fn header_found_below_title_rows() {
        let csv = "2023 cancer statistics,,\n,,\n명칭,진료인원,비고\n위암,\"12,000\",x\n";
        let t = Table::from_reader(csv.as_bytes(), "t1", CANCER_COLUMNS, Some(CANCER_NAME))
            .unwrap();
        assert_eq!(t.columns(), &["cancer_name", "patient_count", "비고"]);
        assert_eq!(t.len(), 1);
        let col = t.column_index(PATIENT_COUNT).unwrap();
        assert_eq!(t.number(0, col), Some(12_000.0));
    }

    #[test]
    fn missing_hint_column_is_reported() {
        let csv = "a,b\n1,2\n";
        let err = Table::from_reader(csv.as_bytes(), "t1", CANCER_COLUMNS, Some(CANCER_NAME))
            .unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "cancer_name"));
    }

    #[test]
    fn blank_rows_are_skipped_and_short_rows_padded() {
        let csv = "a,b\n1\n,\n3,4\n";
        let t = Table::from_reader(csv.as_bytes(), "t", &[], None).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(0, 1), "");
        assert_eq!(t.cell(1, 1), "4");
    }
}
