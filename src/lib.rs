//! Housing price prediction - training pipeline and prediction service
//!
//! This crate provides:
//! - Fitted preprocessing (median imputation, one-hot encoding, ratio features)
//! - A histogram gradient boosted regressor
//! - A training pipeline that persists model, preprocessing and metrics
//! - An HTTP server that replays the fitted preprocessing before predicting
//!
//! # Modules
//!
//! - [`preprocessing`] - Imputer, encoder, engineered features, scaler
//! - [`training`] - Gradient boosting, metrics, frame-level model
//! - [`pipeline`] - Training orchestration and artifact layout
//! - [`inference`] - Artifact loading and preprocessing replay
//! - [`registry`] - Local model registry and URI resolution
//! - [`server`] - REST API
//! - [`cli`] - Command-line interface

pub mod error;
pub mod config;

pub mod preprocessing;
pub mod training;
pub mod pipeline;
pub mod inference;
pub mod registry;

pub mod server;
pub mod cli;

pub mod utils;

pub use error::{HousingError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{HousingError, Result};
    pub use crate::inference::{load_artifacts, predict_raw, preprocess, ArtifactBundle};
    pub use crate::pipeline::{fit_pipeline, run_training, MetricsReport, TrainingOutcome};
    pub use crate::preprocessing::{
        add_engineered_features, apply_fitted, HandleUnknown, MedianImputer, OneHotEncoder,
        StandardScaler,
    };
    pub use crate::training::{evaluate_regression, HousingModel, HyperParams, RegressionMetrics};
}
