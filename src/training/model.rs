//! Frame-level model wrapper
//!
//! [`HousingModel`] remembers the feature columns it was trained on and always
//! builds its input matrix by name, in that order.

use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::HyperParams;
use super::gradient_boosting::GradientBoostingRegressor;
use crate::error::{HousingError, Result};

/// Fitted regressor plus the feature layout it expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingModel {
    feature_names: Vec<String>,
    regressor: GradientBoostingRegressor,
}

impl HousingModel {
    /// Train a gradient boosted regressor on every column of `x`
    pub fn fit(x: &DataFrame, y: &[f64], params: &HyperParams) -> Result<Self> {
        let feature_names: Vec<String> = x
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let matrix = frame_to_matrix(x, &feature_names)?;
        let target = Array1::from_vec(y.to_vec());

        info!(
            n_samples = matrix.nrows(),
            n_features = matrix.ncols(),
            max_iter = params.max_iter,
            learning_rate = params.learning_rate,
            "Fitting gradient boosting regressor"
        );
        let regressor = GradientBoostingRegressor::fit(params.clone(), &matrix, &target)?;
        info!(n_iter = regressor.n_iter(), "Regressor fitted");

        Ok(Self {
            feature_names,
            regressor,
        })
    }

    /// One prediction per row of `x`, in row order
    pub fn predict(&self, x: &DataFrame) -> Result<Vec<f64>> {
        let matrix = frame_to_matrix(x, &self.feature_names)?;
        Ok(self.regressor.predict(&matrix)?.to_vec())
    }

    /// Feature columns in training order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Underlying regressor
    pub fn regressor(&self) -> &GradientBoostingRegressor {
        &self.regressor
    }
}

/// Build a row-major `f64` matrix from the named columns; nulls become NaN
pub fn frame_to_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut values: Vec<Vec<f64>> = Vec::with_capacity(columns.len());
    for name in columns {
        let column = df
            .column(name)
            .map_err(|_| HousingError::ColumnNotFound(name.clone()))?;
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        let ca = series.f64()?;
        values.push(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect());
    }

    let n_rows = df.height();
    Ok(Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| values[j][i]))
}
