use thiserror::Error;

use medrisk_data::DataError;
use medrisk_model::ModelError;

/// Errors raised by a prediction or recommendation call
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("annual income must be greater than 0, got {0}")]
    InvalidIncome(f64),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no correction factor for hospital type '{0}'")]
    UnknownHospitalType(String),
    #[error("unknown risk level '{0}'")]
    UnknownRiskLevel(String),
    #[error("cost model failed on features {row:?}: {source}")]
    Model {
        row: [f64; 4],
        #[source]
        source: ModelError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid risk thresholds: {0}")]
    InvalidThresholds(String),
}

/// Failure to append to or read the risk history log
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("risk history {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("risk history {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Startup failure while assembling the engine from configuration
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
