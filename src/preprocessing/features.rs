//! Stateless derived features

use polars::prelude::*;

use crate::error::{HousingError, Result};

pub const ROOMS_PER_HOUSEHOLD: &str = "rooms_per_household";
pub const BEDROOMS_PER_ROOM: &str = "bedrooms_per_room";
pub const POPULATION_PER_HOUSEHOLD: &str = "population_per_household";

/// Ratio columns added by [`add_engineered_features`]: (output, numerator, denominator)
const RATIOS: [(&str, &str, &str); 3] = [
    (ROOMS_PER_HOUSEHOLD, "total_rooms", "households"),
    (BEDROOMS_PER_ROOM, "total_bedrooms", "total_rooms"),
    (POPULATION_PER_HOUSEHOLD, "population", "households"),
];

/// Append per-household and per-room ratios.
///
/// Division follows IEEE semantics: a zero denominator yields `inf` or `NaN`
/// instead of an error. A null operand yields null.
pub fn add_engineered_features(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for (name, numerator, denominator) in RATIOS {
        let num = float_column(df, numerator)?;
        let den = float_column(df, denominator)?;

        let ratio = &num / &den;

        result.with_column(ratio.with_name(name.into()).into_series())?;
    }
    Ok(result)
}

/// Names of the columns [`add_engineered_features`] produces
pub fn engineered_feature_names() -> Vec<&'static str> {
    RATIOS.iter().map(|(name, _, _)| *name).collect()
}

fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| HousingError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.clone())
}
