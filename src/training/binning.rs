//! Feature discretization for histogram-based tree growing
//!
//! Every feature is mapped to at most `max_bins` ordered bins. Bin edges come
//! from midpoints between distinct training values when there are few of them,
//! and from evenly spaced quantiles otherwise. NaN always lands in
//! [`MISSING_BIN`].

use ndarray::{Array2, ArrayView1, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::MAX_BINS_LIMIT;
use crate::error::{HousingError, Result};

/// Bin index reserved for missing values
pub const MISSING_BIN: u8 = 255;

/// Above this many rows, bin edges are computed on a seeded subsample
const BINNING_SUBSAMPLE: usize = 200_000;

/// Learned bin edges for every feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinMapper {
    /// Per feature, strictly increasing upper edges; bin `b` holds values `<= thresholds[b]`
    thresholds: Vec<Vec<f64>>,
}

impl BinMapper {
    /// Compute bin edges from the training matrix
    pub fn fit(x: &Array2<f64>, max_bins: usize, seed: u64) -> Result<Self> {
        if !(2..=MAX_BINS_LIMIT).contains(&max_bins) {
            return Err(HousingError::invalid_parameter(
                "max_bins",
                max_bins,
                format!("must be between 2 and {}", MAX_BINS_LIMIT),
            ));
        }

        let rows = subsample_rows(x.nrows(), seed);
        let sample = match &rows {
            Some(indices) => x.select(Axis(0), indices),
            None => x.to_owned(),
        };

        let thresholds = (0..sample.ncols())
            .into_par_iter()
            .map(|j| find_thresholds(sample.column(j), max_bins))
            .collect();

        Ok(Self { thresholds })
    }

    /// Number of features the mapper was fitted on
    pub fn n_features(&self) -> usize {
        self.thresholds.len()
    }

    /// Number of non-missing bins for a feature
    pub fn n_bins(&self, feature: usize) -> usize {
        self.thresholds[feature].len() + 1
    }

    /// Upper edge of a bin, used as the real-valued split threshold
    pub fn threshold(&self, feature: usize, bin: u8) -> f64 {
        self.thresholds[feature]
            .get(bin as usize)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Map a single value to its bin
    #[inline]
    pub fn bin_value(&self, feature: usize, value: f64) -> u8 {
        if value.is_nan() {
            MISSING_BIN
        } else {
            self.thresholds[feature].partition_point(|&t| t < value) as u8
        }
    }

    /// Bin a whole matrix; the result is column-major (one `Vec` per feature)
    pub fn transform(&self, x: &Array2<f64>) -> Result<Vec<Vec<u8>>> {
        if x.ncols() != self.n_features() {
            return Err(HousingError::DataError(format!(
                "expected {} features, got {}",
                self.n_features(),
                x.ncols()
            )));
        }

        Ok((0..x.ncols())
            .into_par_iter()
            .map(|j| x.column(j).iter().map(|&v| self.bin_value(j, v)).collect())
            .collect())
    }
}

fn subsample_rows(n_rows: usize, seed: u64) -> Option<Vec<usize>> {
    if n_rows <= BINNING_SUBSAMPLE {
        return None;
    }
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(&mut rng);
    indices.truncate(BINNING_SUBSAMPLE);
    indices.sort_unstable();
    Some(indices)
}

fn find_thresholds(column: ArrayView1<f64>, max_bins: usize) -> Vec<f64> {
    let mut values: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let mut distinct = values.clone();
    distinct.dedup();

    if distinct.len() <= max_bins {
        return distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    }

    let mut thresholds: Vec<f64> = (1..max_bins)
        .map(|i| percentile(&values, i as f64 / max_bins as f64))
        .collect();
    thresholds.dedup();
    thresholds
}

/// Linear-interpolated quantile of sorted values, `q` in [0, 1]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_few_distinct_values_use_midpoints() {
        let x = Array2::from_shape_vec((6, 1), vec![1.0, 2.0, 2.0, 3.0, 1.0, 3.0]).unwrap();
        let mapper = BinMapper::fit(&x, 255, 0).unwrap();

        assert_eq!(mapper.n_bins(0), 3);
        assert_eq!(mapper.threshold(0, 0), 1.5);
        assert_eq!(mapper.threshold(0, 1), 2.5);
        assert_eq!(mapper.bin_value(0, 1.0), 0);
        assert_eq!(mapper.bin_value(0, 2.0), 1);
        assert_eq!(mapper.bin_value(0, 3.0), 2);
    }

    #[test]
    fn test_many_distinct_values_are_capped() {
        let x = Array2::from_shape_vec((1000, 1), (0..1000).map(|i| i as f64).collect()).unwrap();
        let mapper = BinMapper::fit(&x, 16, 0).unwrap();

        assert!(mapper.n_bins(0) <= 16);
        let binned = mapper.transform(&x).unwrap();
        assert!(binned[0].iter().all(|&b| (b as usize) < 16));
        // Bins are monotone in the value
        assert!(binned[0].windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_nan_maps_to_missing_bin() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, f64::NAN, 3.0, 4.0]).unwrap();
        let mapper = BinMapper::fit(&x, 255, 0).unwrap();

        assert_eq!(mapper.bin_value(0, f64::NAN), MISSING_BIN);
        assert_eq!(mapper.bin_value(0, f64::INFINITY) as usize, mapper.n_bins(0) - 1);
        assert_eq!(mapper.bin_value(0, f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_value_below_threshold_matches_bin() {
        let x = Array2::from_shape_vec((500, 1), (0..500).map(|i| (i as f64).sqrt()).collect()).unwrap();
        let mapper = BinMapper::fit(&x, 32, 0).unwrap();

        for &v in &[0.0, 3.3, 7.9, 12.0, 22.3] {
            let bin = mapper.bin_value(0, v);
            for b in 0..(mapper.n_bins(0) as u8) {
                assert_eq!(bin <= b, v <= mapper.threshold(0, b));
            }
        }
    }

    #[test]
    fn test_invalid_max_bins() {
        let x = Array2::<f64>::zeros((3, 1));
        assert!(BinMapper::fit(&x, 1, 0).is_err());
        assert!(BinMapper::fit(&x, 300, 0).is_err());
    }
}
