use thiserror::Error;

/// Errors raised while reading or validating source data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },
    #[error("malformed insurance feed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required column '{column}' in {origin}")]
    MissingColumn { column: String, origin: String },
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),
}
