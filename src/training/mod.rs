//! Model training module
//!
//! Provides the histogram gradient boosted regressor used for house prices:
//! - Feature binning and best-first tree growing
//! - Boosting with squared-error loss
//! - Regression metrics (MAE, RMSE, R²)
//! - A frame-level model wrapper keyed by column name

mod config;
pub mod binning;
pub mod tree;
pub mod gradient_boosting;
pub mod metrics;
pub mod model;

pub use config::{HyperParams, MAX_BINS_LIMIT};
pub use binning::{BinMapper, MISSING_BIN};
pub use tree::{HistTree, TreeNode};
pub use gradient_boosting::GradientBoostingRegressor;
pub use metrics::{evaluate_regression, RegressionMetrics};
pub use model::{frame_to_matrix, HousingModel};

use polars::prelude::DataFrame;

use crate::error::Result;

/// Fit a [`HousingModel`] on a fully preprocessed feature frame
pub fn train_model(x: &DataFrame, y: &[f64], params: &HyperParams) -> Result<HousingModel> {
    HousingModel::fit(x, y, params)
}
