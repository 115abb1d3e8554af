//! Gradient boosting hyperparameters

use serde::{Deserialize, Serialize};

use crate::error::{HousingError, Result};

/// Largest number of non-missing bins a feature can be discretized into.
/// One more slot is reserved for missing values so bin indices fit in a `u8`.
pub const MAX_BINS_LIMIT: usize = 255;

/// Hyperparameters for the histogram gradient boosting regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HyperParams {
    /// Maximum depth of each tree (None = unlimited, bounded by `max_leaf_nodes`)
    pub max_depth: Option<usize>,

    /// Shrinkage applied to every leaf value
    pub learning_rate: f64,

    /// Number of boosting iterations (one tree per iteration)
    pub max_iter: usize,

    /// Seed for every randomized step of training
    pub random_state: u64,

    /// Maximum number of leaves per tree
    pub max_leaf_nodes: usize,

    /// Minimum number of training samples per leaf
    pub min_samples_leaf: usize,

    /// L2 regularization on leaf values
    pub l2_regularization: f64,

    /// Maximum number of bins for non-missing values, per feature
    pub max_bins: usize,
}

impl Default for HyperParams {
    fn default() -> Self {
        Self {
            max_depth: Some(8),
            learning_rate: 0.1,
            max_iter: 200,
            random_state: 42,
            max_leaf_nodes: 31,
            min_samples_leaf: 20,
            l2_regularization: 0.0,
            max_bins: MAX_BINS_LIMIT,
        }
    }
}

impl HyperParams {
    /// Create hyperparameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Builder method to set learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Builder method to set the number of boosting iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the minimum leaf size
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Check every field against its valid range
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(HousingError::invalid_parameter(
                "learning_rate",
                self.learning_rate,
                "must be a positive finite number",
            ));
        }
        if self.max_iter == 0 {
            return Err(HousingError::invalid_parameter("max_iter", self.max_iter, "must be at least 1"));
        }
        if let Some(depth) = self.max_depth {
            if depth == 0 {
                return Err(HousingError::invalid_parameter("max_depth", depth, "must be at least 1"));
            }
        }
        if self.max_leaf_nodes < 2 {
            return Err(HousingError::invalid_parameter(
                "max_leaf_nodes",
                self.max_leaf_nodes,
                "must be at least 2",
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(HousingError::invalid_parameter(
                "min_samples_leaf",
                self.min_samples_leaf,
                "must be at least 1",
            ));
        }
        if !(self.l2_regularization >= 0.0 && self.l2_regularization.is_finite()) {
            return Err(HousingError::invalid_parameter(
                "l2_regularization",
                self.l2_regularization,
                "must be a non-negative finite number",
            ));
        }
        if !(2..=MAX_BINS_LIMIT).contains(&self.max_bins) {
            return Err(HousingError::invalid_parameter(
                "max_bins",
                self.max_bins,
                format!("must be between 2 and {}", MAX_BINS_LIMIT),
            ));
        }
        Ok(())
    }
}
