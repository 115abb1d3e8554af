//! Error types for the housing pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, HousingError>;

/// Main error type for training, preprocessing and inference
#[derive(Error, Debug)]
pub enum HousingError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("Unknown category {category:?} in column {column}")]
    UnknownCategory { column: String, category: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl HousingError {
    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        HousingError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for HousingError {
    fn from(err: polars::error::PolarsError) -> Self {
        match err {
            polars::error::PolarsError::ColumnNotFound(msg) => {
                HousingError::ColumnNotFound(msg.to_string())
            }
            other => HousingError::DataError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for HousingError {
    fn from(err: serde_json::Error) -> Self {
        HousingError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for HousingError {
    fn from(err: bincode::Error) -> Self {
        HousingError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HousingError {
    fn from(err: ndarray::ShapeError) -> Self {
        HousingError::DataError(format!("invalid shape: {}", err))
    }
}
