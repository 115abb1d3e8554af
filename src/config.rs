//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{HousingError, Result};
use crate::training::HyperParams;

pub const DEFAULT_DATA_PATH: &str = "data/raw/housing.csv";
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts/production";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// File names inside an artifact directory
pub const MODEL_FILE: &str = "model.bin";
pub const IMPUTER_FILE: &str = "imputer.bin";
pub const ENCODER_FILE: &str = "encoder.bin";
pub const METRICS_FILE: &str = "metrics.json";

/// Everything the training run needs besides the data itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_path: PathBuf,
    pub artifact_dir: PathBuf,
    pub log_dir: PathBuf,
    pub target_column: String,
    /// Numeric column filled by the median imputer
    pub impute_column: String,
    /// Categorical column expanded by the one-hot encoder
    pub categorical_column: String,
    pub test_size: f64,
    pub split_seed: u64,
    pub hyperparams: HyperParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            target_column: "median_house_value".to_string(),
            impute_column: "total_bedrooms".to_string(),
            categorical_column: "ocean_proximity".to_string(),
            test_size: 0.2,
            split_seed: 42,
            hyperparams: HyperParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults, with paths overridable by `HOUSING_DATA_PATH`,
    /// `HOUSING_ARTIFACT_DIR` and `HOUSING_LOG_DIR`
    pub fn from_env() -> Self {
        Self {
            data_path: env_path("HOUSING_DATA_PATH", DEFAULT_DATA_PATH),
            artifact_dir: env_path("HOUSING_ARTIFACT_DIR", DEFAULT_ARTIFACT_DIR),
            log_dir: env_path("HOUSING_LOG_DIR", DEFAULT_LOG_DIR),
            ..Self::default()
        }
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn with_hyperparams(mut self, hyperparams: HyperParams) -> Self {
        self.hyperparams = hyperparams;
        self
    }

    /// Check the split fraction and hyperparameters
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(HousingError::invalid_parameter(
                "test_size",
                self.test_size,
                "must be between 0 and 1 (exclusive)",
            ));
        }
        if self.target_column.is_empty() {
            return Err(HousingError::ConfigError("target column must be set".to_string()));
        }
        self.hyperparams.validate()
    }

    pub fn train_log_path(&self) -> PathBuf {
        self.log_dir.join("train.log")
    }
}

pub(crate) fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
