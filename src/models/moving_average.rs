//! Moving-average forecaster with a rolling-mean trend extension.
//!
//! The forecast extends the last rolling mean by the slope observed across
//! the most recent rolling means, then applies the same weak calendar
//! multiplier the other simple strategies use (with a wider amplitude).

use crate::core::{ForecastPoint, PreparedSeries};
use crate::error::{ForecastError, Result};
use crate::models::{
    blend_seam, build_points, future_months, seasonal_multiplier, ModelKind, Strategy,
};

/// Default rolling window.
const DEFAULT_WINDOW: usize = 3;
/// Amplitude of the seasonal multiplier.
const SEASONAL_AMPLITUDE: f64 = 0.05;
/// Weight of the last actual in the first forecast point.
const SEAM_WEIGHT: f64 = 0.6;
/// How many trailing rolling means feed the trend slope.
const TREND_SPAN: usize = 3;

/// Moving average with trend forecaster.
#[derive(Debug, Clone, Copy)]
pub struct MovingAverageTrend {
    window: usize,
}

impl MovingAverageTrend {
    /// Create with the default window of 3.
    pub fn new() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }

    /// Create with a custom window.
    pub fn with_window(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "window must be positive".to_string(),
            ));
        }
        Ok(Self { window })
    }

    /// The rolling window size.
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for MovingAverageTrend {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for MovingAverageTrend {
    fn kind(&self) -> ModelKind {
        ModelKind::MovingAverage
    }

    fn min_history(&self) -> usize {
        self.window
    }

    fn forecast_series(
        &self,
        series: &PreparedSeries,
        periods: usize,
    ) -> Result<Vec<ForecastPoint>> {
        let values = series.values();
        if values.len() < self.window {
            return Err(ForecastError::InsufficientData {
                needed: self.window,
                got: values.len(),
            });
        }

        let rolling: Vec<f64> = series
            .rolling_means(self.window)
            .into_iter()
            .flatten()
            .collect();
        // min_history guarantees at least one full window.
        let last_mean = *rolling.last().ok_or(ForecastError::EmptyData)?;

        let tail = &rolling[rolling.len().saturating_sub(TREND_SPAN)..];
        let trend = if tail.len() >= 2 {
            (tail[tail.len() - 1] - tail[0]) / (tail.len() - 1) as f64
        } else {
            0.0
        };

        let last_date = series.last_date().ok_or(ForecastError::EmptyData)?;
        let last_actual = series.last_value().ok_or(ForecastError::EmptyData)?;
        let dates = future_months(last_date, periods)?;

        let forecasts: Vec<f64> = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                let h = (i + 1) as f64;
                let raw = (last_mean + trend * h) * seasonal_multiplier(date, SEASONAL_AMPLITUDE);
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
        PreparedSeries::from_observations("Films", "revenue", observations).unwrap()
    }

    #[test]
    fn window_must_be_positive() {
        assert!(MovingAverageTrend::with_window(0).is_err());
        assert_eq!(MovingAverageTrend::with_window(4).unwrap().window(), 4);
        assert_eq!(MovingAverageTrend::new().window(), 3);
    }

    #[test]
    fn flat_series_stays_within_the_seasonal_band() {
        let series = make_series(&[1000.0; 12]);
        let model = MovingAverageTrend::new();

        let points = model.forecast_series(&series, 6).unwrap();

        assert_eq!(points.len(), 6);
        for point in &points {
            assert!(
                point.value >= 950.0 && point.value <= 1050.0,
                "period {} out of band: {}",
                point.period,
                point.value
            );
        }
    }

    #[test]
    fn rising_series_keeps_rising() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 + 20.0 * i as f64).collect();
        let series = make_series(&values);
        let model = MovingAverageTrend::new();

        let points = model.forecast_series(&series, 4).unwrap();

        // Slope of the trailing rolling means is 20 per step.
        assert!(points[3].value > points[1].value);
        assert!(points[0].value > 250.0);
    }

    #[test]
    fn requires_a_full_window() {
        let series = make_series(&[10.0, 20.0]);
        let model = MovingAverageTrend::new();
        assert!(matches!(
            model.forecast_series(&series, 3),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));

        let wide = MovingAverageTrend::with_window(5).unwrap();
        let series = make_series(&[1.0, 2.0, 3.0, 4.0]);
        assert!(wide.forecast_series(&series, 3).is_err());
    }

    #[test]
    fn never_negative_even_on_collapsing_series() {
        let series = make_series(&[100.0, 60.0, 20.0, 5.0, 1.0]);
        let model = MovingAverageTrend::new();

        let points = model.forecast_series(&series, 12).unwrap();
        for point in &points {
            assert!(point.value >= 0.0);
        }
    }
}
