//! One-hot encoding for a single categorical column

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::error::{HousingError, Result};

/// What to do with a category that was not seen during fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleUnknown {
    /// Encode as all zeros across the known indicator columns
    #[default]
    Ignore,
    /// Fail with [`HousingError::UnknownCategory`]
    Error,
}

/// Expands one categorical column into fixed binary indicator columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    column: String,
    /// Sorted; position defines the output column slot
    categories: Vec<String>,
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    /// Record the distinct non-null categories of `column`
    pub fn fit(df: &DataFrame, column: &str, handle_unknown: HandleUnknown) -> Result<Self> {
        let values = string_values(df, column)?;
        let categories: Vec<String> = values
            .into_iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if categories.is_empty() {
            return Err(HousingError::PreprocessingError(format!(
                "column {} has no categories to encode",
                column
            )));
        }

        debug!(column, n_categories = categories.len(), "Fitted one-hot encoder");
        Ok(Self {
            column: column.to_string(),
            categories,
            handle_unknown,
        })
    }

    /// Replace the categorical column with one `f64` indicator column per known category
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let values = string_values(df, &self.column)?;
        let mut indicators = vec![vec![0.0f64; values.len()]; self.categories.len()];
        let mut n_unknown = 0usize;

        for (row, value) in values.iter().enumerate() {
            let slot = value
                .as_deref()
                .and_then(|v| self.categories.binary_search_by(|c| c.as_str().cmp(v)).ok());

            match slot {
                Some(slot) => indicators[slot][row] = 1.0,
                None => {
                    if self.handle_unknown == HandleUnknown::Error {
                        return Err(HousingError::UnknownCategory {
                            column: self.column.clone(),
                            category: value.clone().unwrap_or_else(|| "null".to_string()),
                        });
                    }
                    n_unknown += 1;
                }
            }
        }

        if n_unknown > 0 {
            warn!(column = %self.column, n_unknown, "Unknown categories encoded as all zeros");
        }

        let mut result = df.drop(&self.column)?;
        for (name, values) in self.output_columns().into_iter().zip(indicators) {
            result.with_column(Series::new(name.into(), values))?;
        }
        Ok(result)
    }

    /// Indicator column names, in output order
    pub fn output_columns(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|category| format!("{}_{}", self.column, category))
            .collect()
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn handle_unknown(&self) -> HandleUnknown {
        self.handle_unknown
    }
}

fn string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let col = df
        .column(column)
        .map_err(|_| HousingError::ColumnNotFound(column.to_string()))?;
    let series = col.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
