//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Accuracy metrics for one (model, group) evaluation.
///
/// `rmse` is always `mse.sqrt()` exactly. `mape` is `None` when every actual
/// value is zero; zero-actual periods are excluded from the MAPE mean so a
/// single zero month never turns the metric into an infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyScore {
    /// Mean Absolute Error.
    pub mae: f64,
    /// Mean Squared Error.
    pub mse: f64,
    /// Root Mean Squared Error.
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals.
    pub mape: Option<f64>,
}

/// Calculate accuracy metrics between actual and predicted values.
pub fn score(actual: &[f64], predicted: &[f64]) -> Result<AccuracyScore> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    for (a, p) in actual.iter().zip(predicted.iter()) {
        let err = a - p;
        abs_sum += err.abs();
        sq_sum += err * err;
    }
    let mae = abs_sum / n;
    let mse = sq_sum / n;
    let rmse = mse.sqrt();

    let percentage_errors: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs())
        .collect();
    let mape = if percentage_errors.is_empty() {
        None
    } else {
        Some(100.0 * percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64)
    };

    Ok(AccuracyScore {
        mae,
        mse,
        rmse,
        mape,
    })
}
