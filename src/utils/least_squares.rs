//! Least squares fitting for the trend-regression strategy.
//!
//! Solves the normal equations with a Cholesky decomposition. Feature
//! columns are ordered, matching the fixed design matrix the trend strategy
//! builds; a non-positive-definite system is reported as an error so the
//! caller can degrade to a simpler fit.

use crate::error::{ForecastError, Result};

/// Fitted linear model: `y = intercept + features · coefficients`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    /// Intercept term.
    pub intercept: f64,
    /// One coefficient per feature column, in input order.
    pub coefficients: Vec<f64>,
}

impl LinearFit {
    /// Predict a single observation from its feature row.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    /// Residuals (`y - y_hat`) over the training columns.
    pub fn residuals(&self, y: &[f64], features: &[Vec<f64>]) -> Vec<f64> {
        y.iter()
            .enumerate()
            .map(|(i, yi)| {
                let row: Vec<f64> = features.iter().map(|col| col[i]).collect();
                yi - self.predict_row(&row)
            })
            .collect()
    }
}

/// Fit `y = intercept + X @ coefficients` over ordered feature columns.
pub fn least_squares(y: &[f64], features: &[Vec<f64>]) -> Result<LinearFit> {
    let n = y.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }

    if features.is_empty() {
        // No features: the best constant fit is the mean.
        let intercept = y.iter().sum::<f64>() / n as f64;
        return Ok(LinearFit {
            intercept,
            coefficients: vec![],
        });
    }

    for column in features {
        if column.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: column.len(),
            });
        }
    }

    let k = features.len();
    let num_params = k + 1;

    // Normal equations: X'X @ beta = X'y with an implicit intercept column.
    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];

    for obs in 0..n {
        xtx[0][0] += 1.0;
        for i in 0..k {
            let xi = features[i][obs];
            xtx[0][i + 1] += xi;
            xtx[i + 1][0] += xi;
            for j in 0..k {
                xtx[i + 1][j + 1] += xi * features[j][obs];
            }
        }

        xty[0] += y[obs];
        for i in 0..k {
            xty[i + 1] += features[i][obs] * y[obs];
        }
    }

    // Small ridge on the diagonal for numerical stability.
    for i in 0..num_params {
        xtx[i][i] += 1e-8;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError("normal equations not positive definite".to_string())
    })?;

    Ok(LinearFit {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
    })
}

/// Solve a symmetric positive definite system via Cholesky decomposition.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L @ L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for t in 0..j {
                sum -= l[i][t] * l[j][t];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * z[j];
        }
        z[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_simple_linear_relationship() {
        // y = 2 + 3x
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();

        let fit = least_squares(&y, &[x]).unwrap();

        assert_relative_eq!(fit.intercept, 2.0, epsilon = 1e-6);
        assert_relative_eq!(fit.coefficients[0], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn fits_multiple_features() {
        // y = 1 + 2*x1 + 3*x2 with non-collinear columns
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = vec![0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(x2.iter())
            .map(|(a, b)| 1.0 + 2.0 * a + 3.0 * b)
            .collect();

        let fit = least_squares(&y, &[x1.clone(), x2.clone()]).unwrap();

        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-5);
        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(fit.coefficients[1], 3.0, epsilon = 1e-5);

        let residuals = fit.residuals(&y, &[x1, x2]);
        for r in residuals {
            assert_relative_eq!(r, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn no_features_yields_mean_intercept() {
        let y = vec![2.0, 4.0, 6.0];
        let fit = least_squares(&y, &[]).unwrap();
        assert_relative_eq!(fit.intercept, 4.0, epsilon = 1e-10);
        assert!(fit.coefficients.is_empty());
        assert_relative_eq!(fit.predict_row(&[]), 4.0, epsilon = 1e-10);
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let result = least_squares(&[1.0, 2.0], &[vec![1.0]]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_target_is_rejected() {
        assert!(matches!(
            least_squares(&[], &[]),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
