//! Feature scaling

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{HousingError, Result};

/// Parameters for one scaled column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    column: String,
    mean: f64,
    std: f64,
}

/// Standard scaling (z-score normalization): (x - mean) / std
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
}

impl StandardScaler {
    /// Learn mean and population standard deviation of each column
    pub fn fit(df: &DataFrame, columns: &[&str]) -> Result<Self> {
        let params = columns
            .iter()
            .map(|&name| {
                let ca = float_column(df, name)?;
                let mean = ca.mean().unwrap_or(0.0);
                let std = ca.std(0).unwrap_or(1.0);
                Ok(ScalerParams {
                    column: name.to_string(),
                    mean,
                    // Constant columns are only centered
                    std: if std == 0.0 || std.is_nan() { 1.0 } else { std },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { params })
    }

    /// Scale the fitted columns, leaving the rest untouched
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let replacements = self
            .params
            .iter()
            .map(|p| {
                let ca = float_column(df, &p.column)?;
                let scaled = (&ca - p.mean) / p.std;
                Ok(scaled.with_name(p.column.as_str().into()).into_series())
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result.with_column(scaled)?;
        }
        Ok(result)
    }
}

fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| HousingError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.clone())
}
