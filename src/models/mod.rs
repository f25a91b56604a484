//! Forecasting strategies and batch dispatch.
//!
//! The strategy set is closed: [`ModelKind`] enumerates every algorithm and
//! [`strategy_for`] maps each variant to its implementation explicitly. The
//! optional external decomposition backend is resolved once through
//! [`available_models`] rather than probed per call.

pub mod exponential;
pub mod moving_average;
#[cfg(feature = "seasonal")]
pub mod seasonal;
pub mod trend;

pub use exponential::HoltSmoothing;
pub use moving_average::MovingAverageTrend;
#[cfg(feature = "seasonal")]
pub use seasonal::SeasonalDecomposition;
pub use trend::TrendRegression;

use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use tracing::{debug, warn};

use crate::core::{
    Diagnostic, Diagnostics, ForecastBatch, ForecastPoint, PreparedData, PreparedSeries,
    SkipReason,
};
use crate::error::{ForecastError, Result};

/// The closed set of forecasting strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelKind {
    /// Holt level/trend smoothing with a weak fixed seasonal multiplier.
    ExponentialSmoothing,
    /// Moving average extended by the recent rolling-mean slope.
    MovingAverage,
    /// Delegation to the external seasonal/trend decomposition backend.
    ExternalSeasonal,
    /// Least-squares regression on index and calendar harmonics.
    TrendRegression,
}

impl ModelKind {
    /// Every strategy, available or not.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::ExponentialSmoothing,
        ModelKind::MovingAverage,
        ModelKind::ExternalSeasonal,
        ModelKind::TrendRegression,
    ];

    /// Stable snake_case tag carried on forecast rows.
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::ExponentialSmoothing => "exponential_smoothing",
            ModelKind::MovingAverage => "moving_average",
            ModelKind::ExternalSeasonal => "seasonal_decomposition",
            ModelKind::TrendRegression => "trend_regression",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::ExponentialSmoothing => "Exponential Smoothing",
            ModelKind::MovingAverage => "Moving Average",
            ModelKind::ExternalSeasonal => "Seasonal Decomposition",
            ModelKind::TrendRegression => "Trend Regression",
        }
    }

    /// Whether this strategy can be constructed in this build.
    pub fn is_available(&self) -> bool {
        match self {
            ModelKind::ExternalSeasonal => cfg!(feature = "seasonal"),
            _ => true,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Strategies usable in this build, in declaration order.
pub fn available_models() -> Vec<ModelKind> {
    ModelKind::ALL
        .iter()
        .copied()
        .filter(ModelKind::is_available)
        .collect()
}

/// Common interface implemented by every forecasting strategy.
///
/// Object-safe so the evaluator can iterate `Box<dyn Strategy>` values.
pub trait Strategy {
    /// Which [`ModelKind`] this strategy implements.
    fn kind(&self) -> ModelKind;

    /// Minimum observed periods a group needs before this strategy applies.
    fn min_history(&self) -> usize;

    /// Forecast `periods` future months for one prepared group.
    fn forecast_series(
        &self,
        series: &PreparedSeries,
        periods: usize,
    ) -> Result<Vec<ForecastPoint>>;
}

/// Map a [`ModelKind`] to its strategy implementation.
///
/// Returns [`ForecastError::DependencyUnavailable`] for
/// [`ModelKind::ExternalSeasonal`] when the `seasonal` feature was not
/// compiled in; callers must treat that strategy as unoffered rather than
/// substitute another.
pub fn strategy_for(kind: ModelKind) -> Result<Box<dyn Strategy>> {
    match kind {
        ModelKind::ExponentialSmoothing => Ok(Box::new(HoltSmoothing::new())),
        ModelKind::MovingAverage => Ok(Box::new(MovingAverageTrend::new())),
        ModelKind::TrendRegression => Ok(Box::new(TrendRegression::new())),
        ModelKind::ExternalSeasonal => external_seasonal(),
    }
}

#[cfg(feature = "seasonal")]
fn external_seasonal() -> Result<Box<dyn Strategy>> {
    Ok(Box::new(SeasonalDecomposition::new()))
}

#[cfg(not(feature = "seasonal"))]
fn external_seasonal() -> Result<Box<dyn Strategy>> {
    Err(ForecastError::DependencyUnavailable(
        "seasonal decomposition requires the `seasonal` feature".to_string(),
    ))
}

/// Forecast every prepared group with the given strategy.
pub fn forecast_all(
    prepared: &PreparedData,
    kind: ModelKind,
    periods: usize,
) -> Result<ForecastBatch> {
    let strategy = strategy_for(kind)?;
    forecast_with(strategy.as_ref(), prepared, periods)
}

/// Forecast every prepared group, skipping short groups with a warning and
/// isolating per-group failures as diagnostics.
pub fn forecast_with(
    strategy: &dyn Strategy,
    prepared: &PreparedData,
    periods: usize,
) -> Result<ForecastBatch> {
    if periods == 0 {
        return Err(ForecastError::InvalidParameter(
            "periods must be positive".to_string(),
        ));
    }

    let mut points = Vec::new();
    let mut diagnostics = Diagnostics::new();

    for series in prepared.series() {
        let needed = strategy.min_history();
        if series.len() < needed {
            warn!(
                group = series.group(),
                model = strategy.kind().label(),
                needed,
                got = series.len(),
                "skipping group with insufficient history"
            );
            diagnostics.push(Diagnostic {
                group: series.group().to_string(),
                model: Some(strategy.kind()),
                reason: SkipReason::InsufficientHistory {
                    needed,
                    got: series.len(),
                },
            });
            continue;
        }

        match strategy.forecast_series(series, periods) {
            Ok(group_points) => points.extend(group_points),
            Err(err) => {
                warn!(
                    group = series.group(),
                    model = strategy.kind().label(),
                    error = %err,
                    "strategy failed for group"
                );
                diagnostics.push(Diagnostic {
                    group: series.group().to_string(),
                    model: Some(strategy.kind()),
                    reason: SkipReason::StrategyFailure(err.to_string()),
                });
            }
        }
    }

    debug!(
        model = strategy.kind().label(),
        points = points.len(),
        skipped = diagnostics.len(),
        "batch forecast complete"
    );

    Ok(ForecastBatch {
        points,
        diagnostics,
    })
}

/// Future month-start dates beginning the month after `last`.
pub(crate) fn future_months(last: NaiveDate, periods: usize) -> Result<Vec<NaiveDate>> {
    let start = last.with_day(1).ok_or_else(|| {
        ForecastError::TimestampError(format!("cannot normalize {last} to month start"))
    })?;
    (1..=periods)
        .map(|h| {
            start
                .checked_add_months(Months::new(h as u32))
                .ok_or_else(|| {
                    ForecastError::TimestampError(format!(
                        "date overflow adding {h} months to {start}"
                    ))
                })
        })
        .collect()
}

/// Weak calendar-month multiplier: `1 + amplitude * sin(2π * month / 12)`.
pub(crate) fn seasonal_multiplier(date: NaiveDate, amplitude: f64) -> f64 {
    1.0 + amplitude * (std::f64::consts::TAU * date.month() as f64 / 12.0).sin()
}

/// Weight the first forecast value toward the last actual so history and
/// forecast connect without a visible jump.
pub(crate) fn blend_seam(last_actual: f64, raw: f64, weight: f64) -> f64 {
    weight * last_actual + (1.0 - weight) * raw
}

/// Assemble one group's forecast rows, enforcing the floor-at-zero and
/// finite-value invariants shared by all strategies.
pub(crate) fn build_points(
    series: &PreparedSeries,
    kind: ModelKind,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    bounds: Option<(Vec<f64>, Vec<f64>)>,
) -> Result<Vec<ForecastPoint>> {
    let mut points = Vec::with_capacity(dates.len());
    for (i, (date, value)) in dates.into_iter().zip(values.into_iter()).enumerate() {
        if !value.is_finite() {
            return Err(ForecastError::ComputationError(format!(
                "non-finite forecast value at period {}",
                i + 1
            )));
        }
        let (lower, upper) = match &bounds {
            Some((lower, upper)) => (
                Some(lower[i].max(0.0)),
                Some(upper[i].max(0.0)),
            ),
            None => (None, None),
        };
        points.push(ForecastPoint {
            date,
            group: series.group().to_string(),
            value: value.max(0.0),
            period: i + 1,
            model: kind,
            lower,
            upper,
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PreparedSeries;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_series(group: &str, values: &[f64]) -> PreparedSeries {
        let observations: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let date = ymd(2023, 1, 1)
                    .checked_add_months(Months::new(i as u32))
                    .unwrap();
                (date, v, None)
            })
            .collect();
        PreparedSeries::from_observations(group, "revenue", observations).unwrap()
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(ModelKind::ExponentialSmoothing.label(), "exponential_smoothing");
        assert_eq!(ModelKind::MovingAverage.label(), "moving_average");
        assert_eq!(ModelKind::ExternalSeasonal.label(), "seasonal_decomposition");
        assert_eq!(ModelKind::TrendRegression.label(), "trend_regression");
        assert_eq!(ModelKind::TrendRegression.to_string(), "Trend Regression");
    }

    #[test]
    fn available_models_reflects_compiled_features() {
        let models = available_models();
        assert!(models.contains(&ModelKind::ExponentialSmoothing));
        assert!(models.contains(&ModelKind::MovingAverage));
        assert!(models.contains(&ModelKind::TrendRegression));
        assert_eq!(
            models.contains(&ModelKind::ExternalSeasonal),
            cfg!(feature = "seasonal")
        );
    }

    #[cfg(not(feature = "seasonal"))]
    #[test]
    fn external_seasonal_is_unoffered_without_feature() {
        let result = strategy_for(ModelKind::ExternalSeasonal);
        assert!(matches!(
            result,
            Err(ForecastError::DependencyUnavailable(_))
        ));
    }

    #[test]
    fn future_months_start_the_month_after_the_last_date() {
        let dates = future_months(ymd(2023, 11, 17), 3).unwrap();
        assert_eq!(dates, vec![ymd(2023, 12, 1), ymd(2024, 1, 1), ymd(2024, 2, 1)]);

        for window in dates.windows(2) {
            assert!(window[1] > window[0]);
        }
    }

    #[test]
    fn seasonal_multiplier_stays_within_amplitude() {
        for month in 1..=12 {
            let m = seasonal_multiplier(ymd(2024, month, 1), 0.05);
            assert!(m >= 0.9499 && m <= 1.0501, "month {month}: {m}");
        }
    }

    #[test]
    fn short_groups_are_skipped_with_diagnostics() {
        let prepared = crate::core::PreparedData::new(vec![
            make_series("Long", &[10.0, 12.0, 14.0, 16.0, 18.0, 20.0]),
            make_series("Short", &[10.0, 12.0]),
        ]);

        let batch = forecast_all(&prepared, ModelKind::ExponentialSmoothing, 4).unwrap();

        assert_eq!(batch.groups(), vec!["Long"]);
        assert_eq!(batch.diagnostics.len(), 1);
        let diagnostic = &batch.diagnostics.entries()[0];
        assert_eq!(diagnostic.group, "Short");
        assert_eq!(
            diagnostic.reason,
            SkipReason::InsufficientHistory { needed: 3, got: 2 }
        );
    }

    #[test]
    fn zero_periods_is_invalid() {
        let prepared = crate::core::PreparedData::new(vec![make_series("A", &[1.0, 2.0, 3.0])]);
        assert!(matches!(
            forecast_all(&prepared, ModelKind::ExponentialSmoothing, 0),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let prepared = crate::core::PreparedData::new(vec![make_series(
            "A",
            &[100.0, 104.0, 109.0, 113.0, 118.0, 122.0],
        )]);

        let first = forecast_all(&prepared, ModelKind::TrendRegression, 6).unwrap();
        let second = forecast_all(&prepared, ModelKind::TrendRegression, 6).unwrap();
        assert_eq!(first, second);
    }
}
