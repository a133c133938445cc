//! Error types for the metrics engine

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while computing metrics
///
/// Only [`EngineError::InvalidWindow`] and [`EngineError::InvalidConfiguration`]
/// ever cross the engine boundary: they are caller errors detected before any
/// computation starts. Record-level problems ([`EngineError::MalformedRecord`])
/// are caught inside the engine, the record is skipped and tallied, and empty
/// samples surface as `insufficient_data` flags on the report rather than as
/// errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Window where start >= end
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    /// Invalid per-invocation configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Required timestamp missing or unparseable for a record
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// An eligible sample of size zero for a metric
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Report serialization failed
    #[error("Report serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}
