//! Holt exponential smoothing with a weak calendar multiplier.
//!
//! The model equations are:
//! - Level: `l_t = α × y_t + (1-α) × (l_{t-1} + b_{t-1})`
//! - Trend: `b_t = β × (l_t - l_{t-1}) + (1-β) × b_{t-1}`
//! - Forecast: `ŷ_{t+h} = (l_t + h × b_t) × (1 + 0.02 × sin(2π × month / 12))`
//!
//! The smoothing parameters and seasonal amplitude are business-tuned
//! compatibility constants, deliberately not estimated from data.

use crate::core::{ForecastPoint, PreparedSeries};
use crate::error::{ForecastError, Result};
use crate::models::{
    blend_seam, build_points, future_months, seasonal_multiplier, ModelKind, Strategy,
};

/// Level smoothing parameter.
const LEVEL_SMOOTHING: f64 = 0.6;
/// Trend smoothing parameter.
const TREND_SMOOTHING: f64 = 0.2;
/// Amplitude of the weak seasonal multiplier.
const SEASONAL_AMPLITUDE: f64 = 0.02;
/// Weight of the last actual in the first forecast point.
const SEAM_WEIGHT: f64 = 0.7;
/// Minimum observed periods per group.
const MIN_HISTORY: usize = 3;

/// Holt level/trend smoothing forecaster.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoltSmoothing;

impl HoltSmoothing {
    pub fn new() -> Self {
        Self
    }

    /// Run the level/trend recurrence over the full history.
    ///
    /// State starts at `l_0 = y_0`, `b_0 = y_1 - y_0`.
    fn smooth(values: &[f64]) -> (f64, f64) {
        let mut level = values[0];
        let mut trend = values[1] - values[0];

        for &y in values.iter().skip(1) {
            let previous_level = level;
            level = LEVEL_SMOOTHING * y + (1.0 - LEVEL_SMOOTHING) * (previous_level + trend);
            trend = TREND_SMOOTHING * (level - previous_level) + (1.0 - TREND_SMOOTHING) * trend;
        }

        (level, trend)
    }
}

impl Strategy for HoltSmoothing {
    fn kind(&self) -> ModelKind {
        ModelKind::ExponentialSmoothing
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
        if values.len() < MIN_HISTORY {
            return Err(ForecastError::InsufficientData {
                needed: MIN_HISTORY,
                got: values.len(),
            });
        }

        let (level, trend) = Self::smooth(&values);

        let last_date = series.last_date().ok_or(ForecastError::EmptyData)?;
        let last_actual = series.last_value().ok_or(ForecastError::EmptyData)?;
        let dates = future_months(last_date, periods)?;

        let forecasts: Vec<f64> = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                let h = (i + 1) as f64;
                let raw = (level + trend * h) * seasonal_multiplier(date, SEASONAL_AMPLITUDE);
                if i == 0 {
                    blend_seam(last_actual, raw, SEAM_WEIGHT)
                } else {
                    raw
                }
            })
            .collect();

        build_points(series, self.kind(), dates, forecasts, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Months, NaiveDate};

    fn make_series(values: &[f64]) -> PreparedSeries {
        let observations: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let date = NaiveDate::from_ymd_opt(2023, 1, 1)
                    .unwrap()
                    .checked_add_months(Months::new(i as u32))
                    .unwrap();
                (date, v, None)
            })
            .collect();
        PreparedSeries::from_observations("Boxes", "revenue", observations).unwrap()
    }

    #[test]
    fn emits_exactly_the_requested_periods() {
        let series = make_series(&[100.0, 110.0, 120.0, 130.0, 140.0, 150.0]);
        let model = HoltSmoothing::new();

        let points = model.forecast_series(&series, 6).unwrap();

        assert_eq!(points.len(), 6);
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point.period, i + 1);
            assert_eq!(point.model, ModelKind::ExponentialSmoothing);
        }
        for window in points.windows(2) {
            assert!(window[1].date > window[0].date);
        }
        assert_eq!(
            points[0].date,
            NaiveDate::from_ymd_opt(2023, 7, 1).unwrap()
        );
    }

    #[test]
    fn first_point_is_seam_blended() {
        let values = [100.0, 110.0, 120.0, 130.0, 140.0, 150.0];
        let series = make_series(&values);
        let model = HoltSmoothing::new();

        let points = model.forecast_series(&series, 2).unwrap();

        let (level, trend) = HoltSmoothing::smooth(&values);
        let first_date = points[0].date;
        let raw = (level + trend) * seasonal_multiplier(first_date, SEASONAL_AMPLITUDE);
        let expected = 0.7 * 150.0 + 0.3 * raw;
        assert_relative_eq!(points[0].value, expected, epsilon = 1e-10);
    }

    #[test]
    fn tracks_a_linear_trend() {
        let values: Vec<f64> = (0..12).map(|i| 50.0 + 10.0 * i as f64).collect();
        let series = make_series(&values);
        let model = HoltSmoothing::new();

        let points = model.forecast_series(&series, 3).unwrap();

        // Forecasts continue rising past the last actual.
        assert!(points[2].value > points[1].value);
        assert!(points[1].value > *values.last().unwrap() * 0.95);
    }

    #[test]
    fn constant_series_stays_near_constant() {
        let series = make_series(&[100.0; 10]);
        let model = HoltSmoothing::new();

        let points = model.forecast_series(&series, 6).unwrap();

        // Deviations stay within the 2% seasonal multiplier band.
        for point in &points {
            assert!((point.value - 100.0).abs() <= 2.5, "value {}", point.value);
        }
    }

    #[test]
    fn declining_series_floors_at_zero() {
        let series = make_series(&[50.0, 30.0, 10.0, 2.0]);
        let model = HoltSmoothing::new();

        let points = model.forecast_series(&series, 12).unwrap();

        for point in &points {
            assert!(point.value >= 0.0);
        }
        // The steep decline drives the tail to the floor.
        assert_eq!(points.last().unwrap().value, 0.0);
    }

    #[test]
    fn short_history_is_rejected() {
        let series = make_series(&[1.0, 2.0]);
        let model = HoltSmoothing::new();
        assert!(matches!(
            model.forecast_series(&series, 3),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));
    }
}
