//! Data preprocessing module
//!
//! Provides the fitted transforms shared by training and serving:
//! - Median imputation of a numeric column
//! - One-hot encoding of a categorical column
//! - Stateless ratio features
//! - Standard scaling
//!
//! Fitted transforms are immutable. Training fits them once on the train split;
//! every later frame goes through [`apply_fitted`], which is the only place the
//! impute → encode → engineer order is defined.

mod imputer;
mod encoder;
mod scaler;
pub mod features;

pub use imputer::MedianImputer;
pub use encoder::{HandleUnknown, OneHotEncoder};
pub use scaler::StandardScaler;
pub use features::{add_engineered_features, engineered_feature_names};

use polars::prelude::DataFrame;

use crate::error::Result;

/// Replay fitted preprocessing on any frame with the raw feature columns
pub fn apply_fitted(
    df: &DataFrame,
    imputer: &MedianImputer,
    encoder: &OneHotEncoder,
) -> Result<DataFrame> {
    let imputed = imputer.transform(df)?;
    let encoded = encoder.transform(&imputed)?;
    add_engineered_features(&encoded)
}
