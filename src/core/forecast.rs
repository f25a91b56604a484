//! Forecast output structures: points, diagnostics, and batches.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use crate::core::PreparedData;
use crate::models::ModelKind;

/// How many trailing historical periods feed the scenario growth baseline.
pub const RECENT_HISTORY_WINDOW: usize = 6;

/// One forecasted observation for a group.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    /// Future date (always a month start).
    pub date: NaiveDate,
    /// Group key the forecast belongs to.
    pub group: String,
    /// Forecasted metric value; never negative, never NaN.
    pub value: f64,
    /// 1-based forecast step.
    pub period: usize,
    /// Strategy that produced this point.
    pub model: ModelKind,
    /// Optional lower confidence bound.
    pub lower: Option<f64>,
    /// Optional upper confidence bound.
    pub upper: Option<f64>,
}

/// Why a group was left out of a forecast or comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Fewer observed periods than the strategy's minimum.
    InsufficientHistory { needed: usize, got: usize },
    /// The strategy failed internally on this group.
    StrategyFailure(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientHistory { needed, got } => {
                write!(f, "insufficient history: need at least {needed}, got {got}")
            }
            SkipReason::StrategyFailure(msg) => write!(f, "strategy failure: {msg}"),
        }
    }
}

/// A non-fatal, per-group issue encountered while forecasting.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Affected group.
    pub group: String,
    /// Strategy involved, when the issue is model-specific.
    pub model: Option<ModelKind>,
    /// What happened.
    pub reason: SkipReason,
}

/// Ordered collection of per-group diagnostics.
///
/// Replaces a global warning sink: callers inspect non-fatal issues on the
/// returned value instead of scraping a log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// All recorded diagnostics in emission order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether anything was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostics affecting a specific group.
    pub fn for_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| d.group == group)
    }
}

/// Growth inputs for scenario synthesis, derived from one forecast batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSummary {
    /// Mean of all forecasted values.
    pub forecast_mean: f64,
    /// Mean of the last [`RECENT_HISTORY_WINDOW`] historical values across
    /// the forecasted groups.
    pub recent_actual_mean: f64,
}

/// The structured result of one batch forecast: points plus diagnostics.
///
/// An empty batch means "insufficient data", not a failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastBatch {
    /// Forecast points for every group that produced output.
    pub points: Vec<ForecastPoint>,
    /// Per-group skips and failures.
    pub diagnostics: Diagnostics,
}

impl ForecastBatch {
    /// Total number of forecast points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check whether any group produced output.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct group keys present in the output, in sorted order.
    pub fn groups(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.points.iter().map(|p| p.group.as_str()).collect();
        set.into_iter().collect()
    }

    /// Forecast points for one group, in period order.
    pub fn points_for<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a ForecastPoint> {
        self.points.iter().filter(move |p| p.group == group)
    }

    /// Growth inputs for scenario synthesis: mean forecasted value against
    /// the mean of each forecasted group's recent history.
    ///
    /// Returns `None` when the batch is empty or no history is available.
    pub fn summary(&self, prepared: &PreparedData) -> Option<ForecastSummary> {
        if self.points.is_empty() {
            return None;
        }

        let forecast_mean =
            self.points.iter().map(|p| p.value).sum::<f64>() / self.points.len() as f64;

        let mut recent = Vec::new();
        for group in self.groups() {
            if let Some(series) = prepared.get(group) {
                let values = series.values();
                let start = values.len().saturating_sub(RECENT_HISTORY_WINDOW);
                recent.extend_from_slice(&values[start..]);
            }
        }
        if recent.is_empty() {
            return None;
        }
        let recent_actual_mean = recent.iter().sum::<f64>() / recent.len() as f64;

        Some(ForecastSummary {
            forecast_mean,
            recent_actual_mean,
        })
    }
}
