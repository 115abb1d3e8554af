//! Inference module
//!
//! Replays the fitted preprocessing on incoming frames and predicts with the
//! loaded model. Nothing here fits or mutates an artifact.

mod bundle;

pub use bundle::{load_artifacts, ArtifactBundle};

use polars::prelude::DataFrame;
use tracing::debug;

use crate::error::Result;
use crate::preprocessing::apply_fitted;
use crate::training::HousingModel;

/// Impute, encode and engineer features using the bundle's fitted transforms
pub fn preprocess(df: &DataFrame, bundle: &ArtifactBundle) -> Result<DataFrame> {
    apply_fitted(df, &bundle.imputer, &bundle.encoder)
}

/// Predict on an already preprocessed frame
pub fn predict(model: &HousingModel, df: &DataFrame) -> Result<Vec<f64>> {
    model.predict(df)
}

/// Preprocess raw rows and predict, in row order
pub fn predict_raw(df: &DataFrame, bundle: &ArtifactBundle) -> Result<Vec<f64>> {
    let features = preprocess(df, bundle)?;
    let predictions = predict(&bundle.model, &features)?;
    debug!(rows = predictions.len(), "Predicted batch");
    Ok(predictions)
}
