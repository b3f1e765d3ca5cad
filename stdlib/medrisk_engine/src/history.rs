//! Append-only risk history log.
//!
//! One row per successful prediction: `timestamp,region,age_group,risk_score`.
//! The header is written when the file is first created. A new log is
//! staged beside its final path with the header already in it and linked
//! into place without clobbering, so concurrent first writers produce a
//! single header.

use std::collections::BTreeMap;
use std::fs::{self, create_dir_all, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::HistoryError;
use crate::input::{AgeGroup, Region};

const HEADER: [&str; 4] = ["timestamp", "region", "age_group", "risk_score"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskHistoryRecord {
    pub timestamp: DateTime<Local>,
    pub region: Region,
    pub age_group: AgeGroup,
    /// Gauge score of the predicted risk level
    pub risk_score: u8,
}

/// Destination for risk history records
pub trait HistorySink: Send + Sync {
    fn append(&self, record: &RiskHistoryRecord) -> Result<(), HistoryError>;
}

/// CSV file sink. Each record goes out in a single `write_all` on an
/// append-mode handle so concurrent writers never interleave partial rows.
#[derive(Debug, Clone)]
pub struct CsvHistoryLog {
    path: PathBuf,
}

impl CsvHistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn csv_err(&self, source: csv::Error) -> HistoryError {
        HistoryError::Csv {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn header_bytes(&self) -> Result<Vec<u8>, HistoryError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(HEADER).map_err(|e| self.csv_err(e))?;
        wtr.into_inner().map_err(|e| self.io_err(e.into_error()))
    }

    /// Create the log holding only its header. Losing the race to another
    /// writer is fine; the winner's header stands.
    fn create_with_header(&self, dir: &Path) -> Result<(), HistoryError> {
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        staged
            .write_all(&self.header_bytes()?)
            .map_err(|e| self.io_err(e))?;
        match staged.persist_noclobber(&self.path) {
            Ok(_) => {
                log::debug!("created risk history {}", self.path.display());
                Ok(())
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(self.io_err(e.error)),
        }
    }
}

impl HistorySink for CsvHistoryLog {
    fn append(&self, record: &RiskHistoryRecord) -> Result<(), HistoryError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        create_dir_all(dir).map_err(|e| self.io_err(e))?;
        match fs::metadata(&self.path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => self.create_with_header(dir)?,
            Err(e) => return Err(self.io_err(e)),
        }

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        // An empty file left by someone else still gets its header here
        let needs_header = file.metadata().map_err(|e| self.io_err(e))?.len() == 0;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if needs_header {
            wtr.write_record(HEADER).map_err(|e| self.csv_err(e))?;
        }
        wtr.serialize(record).map_err(|e| self.csv_err(e))?;
        let buf = wtr.into_inner().map_err(|e| self.io_err(e.into_error()))?;

        file.write_all(&buf).map_err(|e| self.io_err(e))?;
        log::debug!(
            "appended risk history row to {} ({} bytes)",
            self.path.display(),
            buf.len()
        );
        Ok(())
    }
}

/// Mean risk score for one (age group, region) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub age_group: AgeGroup,
    pub region: Region,
    pub mean_risk_score: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskHistory {
    records: Vec<RiskHistoryRecord>,
}

impl RiskHistory {
    pub fn new(records: Vec<RiskHistoryRecord>) -> Self {
        Self { records }
    }

    /// Read a history log back; a log that does not exist yet is empty.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        let origin = path.display().to_string();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no risk history at {origin} yet");
                return Ok(Self::default());
            }
            Err(source) => return Err(HistoryError::Io { path: origin, source }),
        };
        let mut rdr = csv::Reader::from_reader(file);
        let records = rdr
            .deserialize()
            .collect::<Result<Vec<RiskHistoryRecord>, _>>()
            .map_err(|source| HistoryError::Csv {
                path: origin,
                source,
            })?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[RiskHistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean risk score per (age group, region), ordered by age group then region
    pub fn heatmap(&self) -> Vec<HeatmapCell> {
        let mut acc: BTreeMap<(AgeGroup, Region), (f64, usize)> = BTreeMap::new();
        for r in &self.records {
            let e = acc.entry((r.age_group, r.region)).or_insert((0.0, 0));
            e.0 += f64::from(r.risk_score);
            e.1 += 1;
        }
        acc.into_iter()
            .map(|((age_group, region), (sum, count))| HeatmapCell {
                age_group,
                region,
                mean_risk_score: sum / count as f64,
                count,
            })
            .collect()
    }
}
