//! Median imputation for a single numeric column

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HousingError, Result};

/// Fills missing values of one column with its training-time median
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianImputer {
    column: String,
    median: f64,
}

impl MedianImputer {
    /// Learn the median of `column` over its non-missing values
    pub fn fit(df: &DataFrame, column: &str) -> Result<Self> {
        let values = float_column(df, column)?;
        // NaN sorts above every number, so it must not take part in the median
        let observed = values.filter(&values.is_not_nan())?;

        let median = observed.median().ok_or_else(|| {
            HousingError::PreprocessingError(format!(
                "column {} has no observed values to take a median from",
                column
            ))
        })?;

        debug!(column, median, n_observed = observed.len() - observed.null_count(), "Fitted median imputer");
        Ok(Self {
            column: column.to_string(),
            median,
        })
    }

    /// Replace nulls and NaNs in the fitted column; everything else passes through
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let values = float_column(df, &self.column)?;
        let filled = values
            .set(&values.is_nan(), Some(self.median))?
            .fill_null_with_values(self.median)?;

        let mut result = df.clone();
        result.with_column(filled.with_name(self.column.as_str().into()).into_series())?;
        Ok(result)
    }

    /// Column this imputer fills
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Learned fill value
    pub fn median(&self) -> f64 {
        self.median
    }
}

fn float_column(df: &DataFrame, column: &str) -> Result<Float64Chunked> {
    let col = df
        .column(column)
        .map_err(|_| HousingError::ColumnNotFound(column.to_string()))?;
    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "total_bedrooms" => &[Some(1.0), None, Some(3.0), Some(10.0), None],
            "other" => &[Some(5.0), None, Some(1.0), Some(2.0), Some(3.0)]
        )
        .unwrap()
    }

    #[test]
    fn test_median_of_observed_values() {
        let imputer = MedianImputer::fit(&frame(), "total_bedrooms").unwrap();
        assert_eq!(imputer.median(), 3.0);
        assert_eq!(imputer.column(), "total_bedrooms");
    }

    #[test]
    fn test_even_count_median_averages() {
        let df = df!("a" => &[4.0, 1.0, 3.0, 2.0]).unwrap();
        let imputer = MedianImputer::fit(&df, "a").unwrap();
        assert_eq!(imputer.median(), 2.5);
    }

    #[test]
    fn test_transform_fills_only_target_column() {
        let df = frame();
        let imputer = MedianImputer::fit(&df, "total_bedrooms").unwrap();
        let out = imputer.transform(&df).unwrap();

        let filled: Vec<Option<f64>> = out.column("total_bedrooms").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(filled, vec![Some(1.0), Some(3.0), Some(3.0), Some(10.0), Some(3.0)]);

        // Untouched column keeps its null
        assert_eq!(out.column("other").unwrap().null_count(), 1);
    }

    #[test]
    fn test_nan_is_treated_as_missing() {
        let df = df!("a" => &[1.0, f64::NAN, 5.0]).unwrap();
        let imputer = MedianImputer::fit(&df, "a").unwrap();
        assert_eq!(imputer.median(), 3.0);

        let out = imputer.transform(&df).unwrap();
        let values: Vec<f64> = out.column("a").unwrap().f64().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_integer_columns_are_accepted() {
        let df = df!("a" => &[Some(1i64), None, Some(7)]).unwrap();
        let imputer = MedianImputer::fit(&df, "a").unwrap();
        let out = imputer.transform(&df).unwrap();
        assert_eq!(out.column("a").unwrap().null_count(), 0);
    }

    #[test]
    fn test_missing_column() {
        let df = frame();
        let err = MedianImputer::fit(&df, "nope").unwrap_err();
        assert!(matches!(err, HousingError::ColumnNotFound(_)));

        let imputer = MedianImputer::fit(&df, "total_bedrooms").unwrap();
        let other = df!("x" => &[1.0]).unwrap();
        assert!(matches!(
            imputer.transform(&other).unwrap_err(),
            HousingError::ColumnNotFound(c) if c == "total_bedrooms"
        ));
    }

    #[test]
    fn test_nan_does_not_shift_median() {
        // Counting the NaNs as large values would give 3.0
        let df = df!("a" => &[Some(1.0), Some(f64::NAN), None, Some(f64::NAN), Some(2.0), Some(3.0)]).unwrap();
        let imputer = MedianImputer::fit(&df, "a").unwrap();
        assert_eq!(imputer.median(), 2.0);
    }

    #[test]
    fn test_all_nan_column_cannot_be_fitted() {
        let df = df!("a" => &[f64::NAN, f64::NAN]).unwrap();
        assert!(matches!(
            MedianImputer::fit(&df, "a").unwrap_err(),
            HousingError::PreprocessingError(_)
        ));
    }

    #[test]
    fn test_all_missing_column_cannot_be_fitted() {
        let df = df!("a" => &[None::<f64>, None]).unwrap();
        assert!(MedianImputer::fit(&df, "a").is_err());
    }
}
