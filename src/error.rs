//! Error type shared by the scaler, its settings and the logger setup.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by fit and apply calls.
///
/// Every variant is fatal for the call that produced it. Dates without a
/// statistics snapshot and zero-variance features are ordinary data
/// conditions and never show up here.
#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("date column mismatch between statistics ('{fitted}') and argument ('{requested}')")]
    ConfigurationMismatch { fitted: String, requested: String },

    #[error("feature count mismatch at {date}: expected {expected} and got {actual}, check for duplicates")]
    FeatureShapeMismatch {
        date: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{0}' is used both as a feature and as a date or pass-through column")]
    ColumnCollision(String),

    #[error("no feature columns left to scale")]
    NoFeatureColumns,

    #[error("feature column '{column}' has non-numeric type {dtype}")]
    NonNumericFeature { column: String, dtype: String },

    #[error("date column '{column}' has unsupported type {dtype}")]
    UnsupportedDateType { column: String, dtype: String },

    #[error("date column '{0}' holds values outside the signed 64-bit range")]
    DateOutOfRange(String),

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("date kind mismatch: statistics were fitted on {fitted} dates but data has {found} dates")]
    DateKindMismatch {
        fitted: &'static str,
        found: &'static str,
    },

    #[error("corrupt statistics: {0}")]
    CorruptStatistics(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScalerError>;
