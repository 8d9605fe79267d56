use std::path::PathBuf;

use thiserror::Error;

use super::model::SemanticType;

/// Structural failure while reading a source. Value-level problems never
/// surface here; they become [`Value::Missing`](super::model::Value::Missing).
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("source has no header row")]
    Empty,

    #[error("column label '{label}' appears more than once after trimming")]
    DuplicateColumn { label: String },

    #[error("invalid cleaning configuration: {0}")]
    Config(String),
}

/// A query the caller asked for that cannot be answered as stated.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("no column named '{0}'")]
    UnknownColumn(String),

    #[error("column '{column}' is {actual}, expected numeric")]
    NotNumeric {
        column: String,
        actual: SemanticType,
    },

    #[error("predicate on '{column}' does not apply to a {actual} column")]
    PredicateMismatch {
        column: String,
        actual: SemanticType,
    },

    #[error("range on '{column}' has its lower bound above its upper bound")]
    InvalidRange { column: String },
}
