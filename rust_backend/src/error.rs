//! Error types for the quality analysis engine.
//!
//! Empty result sets are not errors: a bucket or entity without data is
//! carried as `None` in the statistic rows and swing summaries.

use std::path::PathBuf;

/// Result type for quality analysis operations
pub type QualityResult<T> = Result<T, QualityError>;

/// Error type for quality analysis operations
#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Schema mismatch in {file}: missing columns {missing:?}")]
    SchemaMismatch { file: PathBuf, missing: Vec<String> },

    #[error("Cannot parse snapshot date from '{name}': {reason}")]
    DateParse { name: String, reason: String },

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table error: {0}")]
    Table(#[from] polars::prelude::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl From<reqwest::Error> for QualityError {
    fn from(e: reqwest::Error) -> Self {
        QualityError::NetworkUnavailable(e.to_string())
    }
}
