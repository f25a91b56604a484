//! Trend regression on index and calendar harmonics.
//!
//! Fits `y = β0 + β1·i + β2·sin(2π·month/12) + β3·cos(2π·month/12)` by least
//! squares and extends the fit into the future. When the normal equations
//! cannot be solved, degrades to a two-point slope/intercept line with the
//! weak seasonal multiplier instead.

use std::f64::consts::TAU;

use tracing::debug;

use crate::core::{ForecastPoint, PreparedSeries};
use crate::error::{ForecastError, Result};
use crate::models::{
    blend_seam, build_points, future_months, seasonal_multiplier, ModelKind, Strategy,
};
use crate::utils::least_squares::{least_squares, LinearFit};
use crate::utils::stats::std_dev;

/// Weight of the last actual in the first forecast point.
const SEAM_WEIGHT: f64 = 0.7;
/// Amplitude of the fallback seasonal multiplier.
const SEASONAL_AMPLITUDE: f64 = 0.02;
/// z-score for the ~95% confidence band.
const INTERVAL_Z: f64 = 1.96;
/// Minimum observed periods per group.
const MIN_HISTORY: usize = 3;

/// Least-squares trend forecaster with calendar harmonics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendRegression;

impl TrendRegression {
    pub fn new() -> Self {
        Self
    }
}

fn month_harmonics(month: u32) -> (f64, f64) {
    let angle = TAU * month as f64 / 12.0;
    (angle.sin(), angle.cos())
}

/// Raw per-step forecasts before seam blending.
enum FittedTrend {
    Regression(LinearFit),
    /// Two-point line fallback: (intercept, slope).
    Line(f64, f64),
}

impl Strategy for TrendRegression {
    fn kind(&self) -> ModelKind {
        ModelKind::TrendRegression
    }

    fn min_history(&self) -> usize {
        MIN_HISTORY
    }

    fn forecast_series(
        &self,
        series: &PreparedSeries,
        periods: usize,
    ) -> Result<Vec<ForecastPoint>> {
        let values = series.values();
        let n = values.len();
        if n < MIN_HISTORY {
            return Err(ForecastError::InsufficientData {
                needed: MIN_HISTORY,
                got: n,
            });
        }

        let index: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let mut sin_col = Vec::with_capacity(n);
        let mut cos_col = Vec::with_capacity(n);
        for point in series.points() {
            let (sin_m, cos_m) = month_harmonics(point.month);
            sin_col.push(sin_m);
            cos_col.push(cos_m);
        }
        let features = vec![index, sin_col, cos_col];

        let (fitted, residuals) = match least_squares(&values, &features) {
            Ok(fit) => {
                let residuals = fit.residuals(&values, &features);
                (FittedTrend::Regression(fit), residuals)
            }
            Err(err) => {
                // Degenerate design matrix: fall back to the line through the
                // first and last observations.
                debug!(group = series.group(), error = %err, "degrading to two-point trend line");
                let slope = (values[n - 1] - values[0]) / (n - 1) as f64;
                let intercept = values[0];
                let residuals: Vec<f64> = values
                    .iter()
                    .enumerate()
                    .map(|(i, y)| y - (intercept + slope * i as f64))
                    .collect();
                (FittedTrend::Line(intercept, slope), residuals)
            }
        };

        let sigma = if residuals.len() >= 2 {
            let s = std_dev(&residuals);
            if s.is_finite() {
                s
            } else {
                0.0
            }
        } else {
            0.0
        };

        let last_date = series.last_date().ok_or(ForecastError::EmptyData)?;
        let last_actual = series.last_value().ok_or(ForecastError::EmptyData)?;
        let dates = future_months(last_date, periods)?;

        let mut forecasts = Vec::with_capacity(periods);
        let mut lower = Vec::with_capacity(periods);
        let mut upper = Vec::with_capacity(periods);
        for (i, &date) in dates.iter().enumerate() {
            let step = (n + i) as f64;
            let raw = match &fitted {
                FittedTrend::Regression(fit) => {
                    let (sin_m, cos_m) = month_harmonics(chrono::Datelike::month(&date));
                    fit.predict_row(&[step, sin_m, cos_m])
                }
                FittedTrend::Line(intercept, slope) => {
                    (intercept + slope * step) * seasonal_multiplier(date, SEASONAL_AMPLITUDE)
                }
            };
            let value = if i == 0 {
                blend_seam(last_actual, raw, SEAM_WEIGHT)
            } else {
                raw
            };
            forecasts.push(value);
            lower.push(value - INTERVAL_Z * sigma);
            upper.push(value + INTERVAL_Z * sigma);
        }

        build_points(series, self.kind(), dates, forecasts, Some((lower, upper)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};

    fn make_series(values: &[f64]) -> PreparedSeries {
        let observations: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let date = NaiveDate::from_ymd_opt(2022, 1, 1)
                    .unwrap()
                    .checked_add_months(Months::new(i as u32))
                    .unwrap();
                (date, v, None)
            })
            .collect();
        PreparedSeries::from_observations("Labels", "revenue", observations).unwrap()
    }

    #[test]
    fn emits_requested_periods_with_monthly_dates() {
        let values: Vec<f64> = (0..24).map(|i| 200.0 + 5.0 * i as f64).collect();
        let series = make_series(&values);
        let model = TrendRegression::new();

        let points = model.forecast_series(&series, 6).unwrap();

        assert_eq!(points.len(), 6);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        for window in points.windows(2) {
            assert!(window[1].date > window[0].date);
        }
    }

    #[test]
    fn recovers_a_linear_trend() {
        let values: Vec<f64> = (0..24).map(|i| 100.0 + 10.0 * i as f64).collect();
        let series = make_series(&values);
        let model = TrendRegression::new();

        let points = model.forecast_series(&series, 3).unwrap();

        // Pure line: the fit should continue it closely (the harmonic terms
        // pick up nothing on a trend-only series).
        let expected_second = 100.0 + 10.0 * 25.0;
        assert!((points[1].value - expected_second).abs() < 15.0);
    }

    #[test]
    fn carries_confidence_bounds() {
        let values: Vec<f64> = (0..18)
            .map(|i| 500.0 + 8.0 * i as f64 + if i % 2 == 0 { 12.0 } else { -12.0 })
            .collect();
        let series = make_series(&values);
        let model = TrendRegression::new();

        let points = model.forecast_series(&series, 4).unwrap();

        for point in &points {
            let lower = point.lower.unwrap();
            let upper = point.upper.unwrap();
            assert!(lower <= point.value);
            assert!(upper >= point.value);
            assert!(lower >= 0.0);
        }
        // Noisy series: the band has real width.
        assert!(points[1].upper.unwrap() > points[1].lower.unwrap());
    }

    #[test]
    fn first_point_leans_toward_the_last_actual() {
        // A jump at the end: seam blending keeps the first forecast close to
        // the final observation rather than the regression line.
        let mut values: Vec<f64> = (0..12).map(|i| 100.0 + 2.0 * i as f64).collect();
        values[11] = 400.0;
        let series = make_series(&values);
        let model = TrendRegression::new();

        let points = model.forecast_series(&series, 2).unwrap();
        assert!(points[0].value > 250.0);
    }

    #[test]
    fn short_history_is_rejected() {
        let series = make_series(&[1.0, 2.0]);
        let model = TrendRegression::new();
        assert!(matches!(
            model.forecast_series(&series, 3),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn never_emits_negative_values() {
        let values: Vec<f64> = (0..12).map(|i| 100.0 - 12.0 * i as f64).collect();
        let series = make_series(&values.iter().map(|v| v.max(0.0)).collect::<Vec<_>>());
        let model = TrendRegression::new();

        let points = model.forecast_series(&series, 12).unwrap();
        for point in &points {
            assert!(point.value >= 0.0);
            assert!(point.lower.unwrap() >= 0.0);
        }
    }
}
