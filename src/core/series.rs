//! Prepared time series structures for grouped business metrics.

use chrono::{Datelike, NaiveDate};

use crate::error::{ForecastError, Result};

/// Rolling-mean windows derived for every prepared point.
pub const SHORT_ROLLING_WINDOW: usize = 3;
/// Longer rolling window used for trend context.
pub const LONG_ROLLING_WINDOW: usize = 6;

/// A single observation of a prepared series with derived features.
///
/// Calendar features and lag/rolling columns are computed once during
/// preparation, in date order, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPoint {
    /// Observation date.
    pub date: NaiveDate,
    /// Metric value (post-aggregation).
    pub value: f64,
    /// Optional secondary metric carried alongside the primary one.
    pub secondary: Option<f64>,
    /// Calendar month (1-12).
    pub month: u32,
    /// Calendar quarter (1-4).
    pub quarter: u32,
    /// Calendar year.
    pub year: i32,
    /// Value one period back, if available.
    pub lag1: Option<f64>,
    /// Value two periods back, if available.
    pub lag2: Option<f64>,
    /// Rolling mean over the last 3 periods, once 3 exist.
    pub rolling3: Option<f64>,
    /// Rolling mean over the last 6 periods, once 6 exist.
    pub rolling6: Option<f64>,
}

/// One group's ordered, prepared time series.
///
/// Built once by [`crate::prepare::prepare`]; immutable; consumed by every
/// forecasting strategy. Invariants: exactly one point per date, dates
/// strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    group: String,
    metric: String,
    points: Vec<PreparedPoint>,
}

impl PreparedSeries {
    /// Build a prepared series from raw (date, value, secondary) observations.
    ///
    /// Observations must already be aggregated to one row per date and sorted
    /// by date; duplicate or out-of-order dates are rejected.
    pub fn from_observations(
        group: impl Into<String>,
        metric: impl Into<String>,
        observations: Vec<(NaiveDate, f64, Option<f64>)>,
    ) -> Result<Self> {
        for window in observations.windows(2) {
            if window[1].0 <= window[0].0 {
                return Err(ForecastError::TimestampError(
                    "dates must be strictly increasing within a group".to_string(),
                ));
            }
        }
        for (_, value, _) in &observations {
            if !value.is_finite() {
                return Err(ForecastError::ComputationError(
                    "non-finite metric value in input".to_string(),
                ));
            }
        }

        Ok(Self {
            group: group.into(),
            metric: metric.into(),
            points: derive_points(observations),
        })
    }

    /// Group key this series belongs to.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Name of the metric column this series was prepared from.
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Prepared points in date order.
    pub fn points(&self) -> &[PreparedPoint] {
        &self.points
    }

    /// Number of observed periods.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Metric values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Observation dates in date order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Last observation date, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Last observed value, if any.
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Chronological prefix of the series with all derived features
    /// re-computed, used for train/test splitting.
    pub fn truncate(&self, len: usize) -> PreparedSeries {
        let observations: Vec<_> = self
            .points
            .iter()
            .take(len)
            .map(|p| (p.date, p.value, p.secondary))
            .collect();
        PreparedSeries {
            group: self.group.clone(),
            metric: self.metric.clone(),
            points: derive_points(observations),
        }
    }

    /// Rolling means over `window` periods; entries are present once a full
    /// window exists at that position.
    pub fn rolling_means(&self, window: usize) -> Vec<Option<f64>> {
        rolling_means(&self.values(), window)
    }
}

/// All prepared series for one metric, keyed and ordered by group.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    series: Vec<PreparedSeries>,
}

impl PreparedData {
    /// Assemble from per-group series; ordering is normalized by group key so
    /// repeated preparations of the same input are identical.
    pub fn new(mut series: Vec<PreparedSeries>) -> Self {
        series.sort_by(|a, b| a.group.cmp(&b.group));
        Self { series }
    }

    /// All prepared series in group order.
    pub fn series(&self) -> &[PreparedSeries] {
        &self.series
    }

    /// Look up one group's series.
    pub fn get(&self, group: &str) -> Option<&PreparedSeries> {
        self.series.iter().find(|s| s.group == group)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Check if no group survived preparation.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Group keys in order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.group.as_str())
    }
}

/// Compute calendar, lag, and rolling features for ordered observations.
fn derive_points(observations: Vec<(NaiveDate, f64, Option<f64>)>) -> Vec<PreparedPoint> {
    let values: Vec<f64> = observations.iter().map(|(_, v, _)| *v).collect();
    let rolling3 = rolling_means(&values, SHORT_ROLLING_WINDOW);
    let rolling6 = rolling_means(&values, LONG_ROLLING_WINDOW);

    observations
        .into_iter()
        .enumerate()
        .map(|(i, (date, value, secondary))| PreparedPoint {
            date,
            value,
            secondary,
            month: date.month(),
            quarter: (date.month() - 1) / 3 + 1,
            year: date.year(),
            lag1: i.checked_sub(1).map(|j| values[j]),
            lag2: i.checked_sub(2).map(|j| values[j]),
            rolling3: rolling3[i],
            rolling6: rolling6[i],
        })
        .collect()
}

/// Rolling means aligned to the input: index `i` holds the mean of the window
/// ending at `i`, once `window` observations exist.
pub(crate) fn rolling_means(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 >= window {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            } else {
                None
            }
        })
        .collect()
}
