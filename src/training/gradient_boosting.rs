//! Gradient Boosting implementation
//!
//! A native histogram-based gradient boosted tree regressor with squared-error
//! loss. Features are binned once, then every iteration grows one tree on the
//! current residual gradients.

use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::binning::BinMapper;
use super::config::HyperParams;
use super::tree::{GrowerParams, HistTree, TreeGrower};
use crate::error::{HousingError, Result};

/// Row count above which per-sample updates run in parallel
const PARALLEL_ROWS: usize = 10_000;

/// Histogram Gradient Boosting Regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    config: HyperParams,
    trees: Vec<HistTree>,
    baseline: f64,
    n_features: usize,
    train_loss: Vec<f64>,
}

impl GradientBoostingRegressor {
    /// Fit the gradient boosting model
    pub fn fit(config: HyperParams, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        config.validate()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples == 0 {
            return Err(HousingError::TrainingError("training set is empty".to_string()));
        }
        if n_samples != y.len() {
            return Err(HousingError::DataError(format!(
                "x has {} rows but y has {} values",
                n_samples,
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(HousingError::TrainingError("target contains non-finite values".to_string()));
        }

        let mapper = BinMapper::fit(x, config.max_bins, config.random_state)?;
        let binned = mapper.transform(x)?;

        let baseline = y.mean().unwrap_or(0.0);
        let mut raw_predictions = vec![baseline; n_samples];
        let hessians = vec![1.0; n_samples];
        let targets = y.to_vec();

        let grower_params = GrowerParams {
            max_depth: config.max_depth,
            max_leaf_nodes: config.max_leaf_nodes,
            min_samples_leaf: config.min_samples_leaf,
            l2_regularization: config.l2_regularization,
            shrinkage: config.learning_rate,
        };

        let mut trees = Vec::with_capacity(config.max_iter);
        let mut train_loss = Vec::with_capacity(config.max_iter);

        for iteration in 0..config.max_iter {
            // Gradient of 0.5 * (pred - y)^2
            let gradients: Vec<f64> = if n_samples > PARALLEL_ROWS {
                raw_predictions
                    .par_iter()
                    .zip(targets.par_iter())
                    .map(|(p, t)| p - t)
                    .collect()
            } else {
                raw_predictions.iter().zip(&targets).map(|(p, t)| p - t).collect()
            };

            let tree =
                TreeGrower::new(&binned, &mapper, &gradients, &hessians, &grower_params).grow();

            let contributions: Vec<f64> = if n_samples > PARALLEL_ROWS {
                (0..n_samples)
                    .into_par_iter()
                    .map(|i| tree.predict_row(x.row(i)))
                    .collect()
            } else {
                x.axis_iter(Axis(0)).map(|row| tree.predict_row(row)).collect()
            };
            for (pred, c) in raw_predictions.iter_mut().zip(contributions) {
                *pred += c;
            }

            let loss = squared_loss(&raw_predictions, &targets);
            train_loss.push(loss);

            let is_stump = tree.n_leaves() == 1;
            trees.push(tree);

            if iteration % 50 == 0 {
                debug!(iteration, loss, "boosting progress");
            }
            if is_stump {
                debug!(iteration, "no further split improves the loss, stopping early");
                break;
            }
        }

        Ok(Self {
            config,
            trees,
            baseline,
            n_features,
            train_loss,
        })
    }

    /// Make predictions, one per row, in row order
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features {
            return Err(HousingError::DataError(format!(
                "expected {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }

        let predict_row = |i: usize| {
            let row = x.row(i);
            self.baseline + self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>()
        };

        let predictions: Vec<f64> = if x.nrows() > PARALLEL_ROWS {
            (0..x.nrows()).into_par_iter().map(predict_row).collect()
        } else {
            (0..x.nrows()).map(predict_row).collect()
        };

        Ok(Array1::from_vec(predictions))
    }

    /// Hyperparameters the model was trained with
    pub fn config(&self) -> &HyperParams {
        &self.config
    }

    /// Number of boosting iterations actually performed
    pub fn n_iter(&self) -> usize {
        self.trees.len()
    }

    /// Mean squared error on the training data after each iteration
    pub fn train_loss(&self) -> &[f64] {
        &self.train_loss
    }

    /// Constant prediction every tree is added to
    pub fn baseline(&self) -> f64 {
        self.baseline
    }
}

fn squared_loss(predictions: &[f64], y: &[f64]) -> f64 {
    let n = predictions.len() as f64;
    predictions
        .iter()
        .zip(y.iter())
        .map(|(p, t)| (p - t).powi(2))
        .sum::<f64>()
        / n
}
