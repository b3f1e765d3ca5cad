//! Header normalization and lenient number parsing for spreadsheet exports.
//!
//! Source sheets arrive with Korean or English headers, stray whitespace and
//! formatted numbers (`1,234,000원`). Everything downstream works against the
//! canonical column names declared here.

/// A canonical column name and the header spellings that map onto it
#[derive(Debug, Clone, Copy)]
pub struct ColumnAlias {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

pub const HOSPITAL_TYPE: &str = "hospital_type";
pub const COST_PER_VISIT: &str = "cost_per_visit";
pub const CORRECTION_FACTOR: &str = "correction_factor";

pub const CANCER_NAME: &str = "cancer_name";
pub const COST_PER_PATIENT: &str = "cost_per_patient";
pub const AVG_DAYS: &str = "avg_days";
pub const PATIENT_COUNT: &str = "patient_count";

pub const HOSPITAL_COLUMNS: &[ColumnAlias] = &[
    ColumnAlias {
        canonical: HOSPITAL_TYPE,
        aliases: &["hospital_type", "구분", "type"],
    },
    ColumnAlias {
        canonical: COST_PER_VISIT,
        aliases: &["cost_per_visit", "cost_per_person", "내원일당진료비"],
    },
    ColumnAlias {
        canonical: CORRECTION_FACTOR,
        aliases: &["correction_factor", "보정계수"],
    },
];

pub const CANCER_COLUMNS: &[ColumnAlias] = &[
    ColumnAlias {
        canonical: CANCER_NAME,
        aliases: &["cancer_name", "명칭", "암종명"],
    },
    ColumnAlias {
        canonical: COST_PER_PATIENT,
        aliases: &["cost_per_patient", "인당진료비"],
    },
    ColumnAlias {
        canonical: AVG_DAYS,
        aliases: &["avg_days", "인당입(내)원일수", "인당입원일수"],
    },
    ColumnAlias {
        canonical: PATIENT_COUNT,
        aliases: &["patient_count", "진료인원"],
    },
];

/// Trim, drop a UTF-8 BOM, collapse inner whitespace to `_` and lower-case.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Map a raw header cell to its canonical name, or to its normalized
/// spelling when no alias matches.
pub fn canonical_name(raw: &str, known: &[ColumnAlias]) -> String {
    let normalized = normalize_header(raw);
    known
        .iter()
        .find(|c| c.aliases.iter().any(|a| normalize_header(a) == normalized))
        .map(|c| c.canonical.to_string())
        .unwrap_or(normalized)
}

/// Parse a spreadsheet number, tolerating thousands separators and a
/// trailing `원`. Blank or unparseable cells are missing values.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim_end_matches('원').trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
