//! HTTP request handlers

use std::sync::Arc;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::error::HousingError;
use crate::inference::predict_raw;

use super::error::{Result, ServerError};
use super::schema::{records_to_frame, PredictionRequest, PredictionResponse};
use super::state::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Preprocess the submitted records with the loaded artifacts and predict
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    let Json(request) = payload?;
    if request.data.is_empty() {
        return Err(ServerError::Validation(
            "data must contain at least one record".to_string(),
        ));
    }

    if state.artifacts().is_none() {
        return Err(ServerError::NotLoaded);
    }

    info!(rows = request.data.len(), "Received prediction request");
    // Frame building and tree traversal are CPU-bound; keep them off the runtime
    let predictions = tokio::task::spawn_blocking(move || -> Result<Vec<f64>> {
        let bundle = state.artifacts().ok_or(ServerError::NotLoaded)?;
        let frame = records_to_frame(&request.data).map_err(HousingError::from)?;
        Ok(predict_raw(&frame, bundle)?)
    })
    .await??;

    Ok(Json(PredictionResponse { predictions }))
}
