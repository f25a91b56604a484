//! Composition of the forecast surface consumed by the dashboard:
//! forecast points, a holdout accuracy score, and the chart handle.

use crate::chart::{render, ChartSpec};
use crate::core::{ForecastBatch, PreparedData};
use crate::error::Result;
use crate::evaluate::{holdout_score, ComparisonConfig};
use crate::models::{forecast_all, ModelKind};
use crate::utils::metrics::AccuracyScore;

/// Everything a single-model forecast run hands back to the caller.
///
/// Ephemeral: derived from the prepared data on every call, never persisted.
#[derive(Debug, Clone)]
pub struct ForecastReport {
    /// Chart handle connecting history and forecast.
    pub chart: ChartSpec,
    /// Forecast points plus per-group diagnostics.
    pub forecast: ForecastBatch,
    /// Mean holdout accuracy over eligible groups; `None` when no group has
    /// enough history to backtest.
    pub metrics: Option<AccuracyScore>,
}

/// Forecast with one strategy and assemble the full report.
pub fn forecast_with_report(
    prepared: &PreparedData,
    kind: ModelKind,
    periods: usize,
) -> Result<ForecastReport> {
    let forecast = forecast_all(prepared, kind, periods)?;
    let metrics = holdout_score(prepared, kind, &ComparisonConfig::new(periods))?;
    let chart = render(prepared, &forecast.points);

    Ok(ForecastReport {
        chart,
        forecast,
        metrics,
    })
}
