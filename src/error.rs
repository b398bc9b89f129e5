//! Store error types.

use thiserror::Error;

/// Errors raised by the employee store and its file loaders.
///
/// Operations that address an unknown employee id are not errors: they are
/// silently ignored by the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store has no records to aggregate over.
    #[error("Employee store is empty")]
    EmptyStore,

    /// The source has no key column.
    #[error("Source is missing key column '{column}'")]
    MissingKeyColumn { column: String },

    /// A row of the source could not be turned into a record.
    #[error("Malformed source at row {row}: {reason}")]
    MalformedSource { row: usize, reason: String },

    /// File extension not handled by the loader or exporter.
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// Text encoding label not recognised.
    #[error("Unsupported encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl StoreError {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        StoreError::MalformedSource {
            row,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the store.
pub type Result<T> = std::result::Result<T, StoreError>;
