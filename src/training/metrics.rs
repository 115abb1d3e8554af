//! Holdout metrics for regression models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{HousingError, Result};

/// Standard regression error metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
}

impl RegressionMetrics {
    /// Metric name to value, in a stable order
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("mae".to_string(), self.mae),
            ("r2".to_string(), self.r2),
            ("rmse".to_string(), self.rmse),
        ])
    }
}

/// Compute MAE, RMSE and R² for aligned true/predicted values
pub fn evaluate_regression(y_true: &[f64], y_pred: &[f64]) -> Result<RegressionMetrics> {
    if y_true.len() != y_pred.len() {
        return Err(HousingError::DataError(format!(
            "y_true has {} values but y_pred has {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(HousingError::DataError("cannot evaluate on an empty set".to_string()));
    }

    let n = y_true.len() as f64;
    let errors: Vec<f64> = y_true.iter().zip(y_pred).map(|(t, p)| t - p).collect();

    let ss_res: f64 = errors.iter().map(|e| e * e).sum();
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let rmse = (ss_res / n).sqrt();

    let y_mean = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();

    // A constant target gives R² = 1 for a perfect fit and 0 otherwise
    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    Ok(RegressionMetrics { mae, rmse, r2 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regression_metrics() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];
        let m = evaluate_regression(&y_true, &y_pred).unwrap();

        assert!((m.mae - 0.5).abs() < 1e-12);
        assert!((m.rmse - 0.375f64.sqrt()).abs() < 1e-12);
        assert!((m.r2 - 0.948_608_137_044_967_9).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_predictions() {
        let y = [1.0, 2.0, 3.0];
        let m = evaluate_regression(&y, &y).unwrap();
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_constant_target() {
        let m = evaluate_regression(&[2.0, 2.0], &[1.0, 3.0]).unwrap();
        assert_eq!(m.r2, 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(evaluate_regression(&[1.0, 2.0], &[1.0]).is_err());
        assert!(evaluate_regression(&[], &[]).is_err());
    }

    #[test]
    fn test_serializes_as_name_to_value() {
        let m = RegressionMetrics { mae: 1.0, rmse: 2.0, r2: 0.5 };
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["mae"], 1.0);
        assert_eq!(json["rmse"], 2.0);
        assert_eq!(json["r2"], 0.5);
        assert_eq!(m.to_map().len(), 3);
    }
}
