//! Error types for the driftguard crate

use thiserror::Error;

/// Result type alias for drift detection operations
pub type Result<T> = std::result::Result<T, DriftError>;

/// Main error type for drift detection
///
/// All variants are local construction/validation failures raised
/// synchronously; none are transient and no retries apply.
#[derive(Error, Debug)]
pub enum DriftError {
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Empty sample: {0}")]
    EmptySample(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Column mismatch: {0}")]
    ColumnMismatch(String),

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown detector: {0}")]
    UnknownDetector(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
