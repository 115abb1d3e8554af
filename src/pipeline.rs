//! Training pipeline
//!
//! load → split → fit imputer (train) → fit encoder (train) → transform both
//! splits → fit model → evaluate both splits → persist.
//! Only the train split ever reaches a `fit` call.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{PipelineConfig, METRICS_FILE};
use crate::error::Result;
use crate::inference::ArtifactBundle;
use crate::preprocessing::{apply_fitted, HandleUnknown, MedianImputer, OneHotEncoder};
use crate::training::{evaluate_regression, train_model, RegressionMetrics};
use crate::utils::{load_csv, save_json, split_features, train_test_split, Timer};

pub const MODEL_FAMILY: &str = "gradient_boosting";
pub const MODEL_NAME: &str = "hist_gradient_boosting";

/// Metrics on both sides of the holdout split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    pub train: RegressionMetrics,
    pub test: RegressionMetrics,
}

/// Contents of `metrics.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub model_family: String,
    pub model_name: String,
    pub holdout: HoldoutMetrics,
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ArtifactBundle,
    pub metrics: MetricsReport,
    pub n_train: usize,
    pub n_test: usize,
}

/// Fit every artifact on an in-memory frame that still holds the target column
pub fn fit_pipeline(df: &DataFrame, config: &PipelineConfig) -> Result<TrainingOutcome> {
    config.validate()?;

    let (train_df, test_df) = train_test_split(df, config.test_size, config.split_seed)?;
    let (train_x, y_train) = split_features(&train_df, &config.target_column)?;
    let (test_x, y_test) = split_features(&test_df, &config.target_column)?;
    info!(train_rows = train_x.height(), test_rows = test_x.height(), "Split data");

    let imputer = MedianImputer::fit(&train_x, &config.impute_column)?;
    let encoder = OneHotEncoder::fit(
        &imputer.transform(&train_x)?,
        &config.categorical_column,
        HandleUnknown::Ignore,
    )?;
    info!(
        median = imputer.median(),
        categories = ?encoder.categories(),
        "Fitted preprocessing on train split"
    );

    let train_features = apply_fitted(&train_x, &imputer, &encoder)?;
    let test_features = apply_fitted(&test_x, &imputer, &encoder)?;

    let timer = Timer::start();
    let model = train_model(&train_features, &y_train, &config.hyperparams)?;
    info!(elapsed_ms = timer.elapsed_ms(), "Model trained");

    let train_metrics = evaluate_regression(&y_train, &model.predict(&train_features)?)?;
    let test_metrics = evaluate_regression(&y_test, &model.predict(&test_features)?)?;
    info!(
        train_rmse = train_metrics.rmse,
        test_rmse = test_metrics.rmse,
        test_mae = test_metrics.mae,
        test_r2 = test_metrics.r2,
        "Evaluated holdout"
    );

    Ok(TrainingOutcome {
        bundle: ArtifactBundle {
            model,
            imputer,
            encoder,
        },
        metrics: MetricsReport {
            model_family: MODEL_FAMILY.to_string(),
            model_name: MODEL_NAME.to_string(),
            holdout: HoldoutMetrics {
                train: train_metrics,
                test: test_metrics,
            },
        },
        n_train: train_features.height(),
        n_test: test_features.height(),
    })
}

/// Full training run: read the raw CSV, fit, and overwrite the artifact directory
pub fn run_training(config: &PipelineConfig) -> Result<TrainingOutcome> {
    info!(data = %config.data_path.display(), artifacts = %config.artifact_dir.display(), "Starting training pipeline");

    let df = load_csv(&config.data_path)?;
    let outcome = fit_pipeline(&df, config)?;

    outcome.bundle.save(&config.artifact_dir)?;
    save_json(&outcome.metrics, &config.artifact_dir.join(METRICS_FILE))?;

    info!(artifacts = %config.artifact_dir.display(), "Training pipeline finished");
    Ok(outcome)
}
