//! External seasonal/trend decomposition strategy.
//!
//! Thin delegation to the `augurs` backend: series long enough for a yearly
//! cycle go through MSTL (seasonal decomposition) with an AutoETS trend
//! model, shorter ones through plain non-seasonal AutoETS. Multiplicative
//! seasonality is realized with a log1p/expm1 transform on non-negative
//! series. Only compiled with the `seasonal` feature; without it the
//! strategy is reported as unavailable, never silently replaced.

use augurs::{
    ets::AutoETS,
    forecaster::{transforms::LinearInterpolator, Forecaster, Transformer},
    mstl::MSTLModel,
};
use tracing::debug;

use crate::core::{ForecastPoint, PreparedSeries};
use crate::error::{ForecastError, Result};
use crate::models::{build_points, future_months, ModelKind, Strategy};

/// Prediction-interval width.
const INTERVAL_WIDTH: f64 = 0.95;
/// Months per yearly seasonal cycle.
const YEARLY_PERIOD: usize = 12;
/// Observations required before the yearly component is fitted.
const YEARLY_MIN_OBSERVATIONS: usize = 24;
/// Minimum observed periods per group.
const MIN_HISTORY: usize = 3;

/// Seasonal/trend decomposition forecaster backed by `augurs`.
#[derive(Debug, Clone, Copy)]
pub struct SeasonalDecomposition {
    interval_width: f64,
}

impl SeasonalDecomposition {
    pub fn new() -> Self {
        Self {
            interval_width: INTERVAL_WIDTH,
        }
    }
}

impl Default for SeasonalDecomposition {
    fn default() -> Self {
        Self::new()
    }
}

fn fit_seasonal(values: &[f64], horizon: usize, level: f64) -> Result<augurs::Forecast> {
    let ets = AutoETS::non_seasonal().into_trend_model();
    let mstl = MSTLModel::new(vec![YEARLY_PERIOD], ets);

    let transformers: Vec<Box<dyn Transformer>> = vec![Box::new(LinearInterpolator::default())];
    let mut forecaster = Forecaster::new(mstl).with_transformers(transformers);

    forecaster
        .fit(values)
        .map_err(|e| ForecastError::ComputationError(format!("MSTL fit error: {e}")))?;
    forecaster
        .predict(horizon, level)
        .map_err(|e| ForecastError::ComputationError(format!("MSTL predict error: {e}")))
}

fn fit_trend_only(values: &[f64], horizon: usize, level: f64) -> Result<augurs::Forecast> {
    let ets = AutoETS::non_seasonal();

    let transformers: Vec<Box<dyn Transformer>> = vec![Box::new(LinearInterpolator::default())];
    let mut forecaster = Forecaster::new(ets).with_transformers(transformers);

    forecaster
        .fit(values)
        .map_err(|e| ForecastError::ComputationError(format!("ETS fit error: {e}")))?;
    forecaster
        .predict(horizon, level)
        .map_err(|e| ForecastError::ComputationError(format!("ETS predict error: {e}")))
}

impl Strategy for SeasonalDecomposition {
    fn kind(&self) -> ModelKind {
        ModelKind::ExternalSeasonal
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

        // Multiplicative seasonality: fit in log space when the scale allows.
        let use_log = values.iter().all(|v| *v >= 0.0);
        let input: Vec<f64> = if use_log {
            values.iter().map(|v| v.ln_1p()).collect()
        } else {
            values.clone()
        };

        let use_yearly = n >= YEARLY_MIN_OBSERVATIONS;
        debug!(
            group = series.group(),
            observations = n,
            yearly = use_yearly,
            log_space = use_log,
            "fitting seasonal decomposition"
        );

        let forecast = if use_yearly {
            fit_seasonal(&input, periods, self.interval_width)?
        } else {
            fit_trend_only(&input, periods, self.interval_width)?
        };

        let back = |v: f64| if use_log { v.exp_m1() } else { v };
        let point: Vec<f64> = forecast.point.iter().map(|&v| back(v)).collect();
        let bounds = forecast.intervals.as_ref().map(|intervals| {
            let lower: Vec<f64> = intervals.lower.iter().map(|&v| back(v)).collect();
            let upper: Vec<f64> = intervals.upper.iter().map(|&v| back(v)).collect();
            (lower, upper)
        });

        let last_date = series.last_date().ok_or(ForecastError::EmptyData)?;
        let dates = future_months(last_date, periods)?;

        build_points(series, self.kind(), dates, point, bounds)
    }
}
