//! Backtesting: chronological holdout evaluation of forecasting strategies.
//!
//! Each group is split into a training prefix and a test tail; every
//! available strategy forecasts from the training slice and is scored
//! against the held-out actuals. Recommendations are derived per metric,
//! independently; there is no single forced winner.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::{Diagnostic, Diagnostics, PreparedData, PreparedSeries, SkipReason};
use crate::error::{ForecastError, Result};
use crate::models::{available_models, strategy_for, ModelKind, Strategy};
use crate::utils::metrics::{score, AccuracyScore};

/// Groups need at least this many periods to take part in a comparison.
pub const MIN_BACKTEST_PERIODS: usize = 6;

/// Configuration for a model comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Forecast horizon requested from each strategy.
    pub periods: usize,
    /// Fraction of each group's history held out for testing.
    pub test_fraction: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            periods: 6,
            test_fraction: 0.2,
        }
    }
}

impl ComparisonConfig {
    /// Create a configuration with the default 20% holdout.
    pub fn new(periods: usize) -> Self {
        Self {
            periods,
            ..Self::default()
        }
    }

    /// Set the holdout fraction.
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }
}

/// Holdout accuracy of one strategy on one group.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub model: ModelKind,
    pub group: String,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub mape: Option<f64>,
    /// How many held-out periods were compared.
    pub test_periods: usize,
}

/// Best strategy per metric, each derived independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub by_mae: Option<ModelKind>,
    pub by_rmse: Option<ModelKind>,
    pub by_mape: Option<ModelKind>,
}

/// The full result of a comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelComparison {
    /// One row per (model, group) that could be scored.
    pub scores: Vec<ModelScore>,
    /// Per-metric winners over the group-mean scores.
    pub recommendations: Recommendations,
    /// Excluded groups and failed fits.
    pub diagnostics: Diagnostics,
}

/// One group's chronological split, ready for scoring.
struct SplitGroup<'a> {
    series: &'a PreparedSeries,
    train: PreparedSeries,
    actual: Vec<f64>,
}

/// Evaluate every available strategy against held-out history.
pub fn compare(prepared: &PreparedData, config: &ComparisonConfig) -> Result<ModelComparison> {
    validate(config)?;

    let mut diagnostics = Diagnostics::new();
    let splits = split_groups(prepared, config.test_fraction, &mut diagnostics);

    let mut scores = Vec::new();
    for kind in available_models() {
        let strategy = strategy_for(kind)?;
        scores.extend(score_strategy(
            strategy.as_ref(),
            &splits,
            config.periods,
            &mut diagnostics,
        ));
    }

    let recommendations = recommend(&scores);
    debug!(
        scored = scores.len(),
        skipped = diagnostics.len(),
        "model comparison complete"
    );

    Ok(ModelComparison {
        scores,
        recommendations,
        diagnostics,
    })
}

/// Mean holdout accuracy of a single strategy across eligible groups.
///
/// Returns `None` when no group could be scored. The aggregated `rmse` is
/// recomputed from the aggregated `mse` so the two stay consistent.
pub fn holdout_score(
    prepared: &PreparedData,
    kind: ModelKind,
    config: &ComparisonConfig,
) -> Result<Option<AccuracyScore>> {
    validate(config)?;

    let mut diagnostics = Diagnostics::new();
    let splits = split_groups(prepared, config.test_fraction, &mut diagnostics);
    let strategy = strategy_for(kind)?;
    let scores = score_strategy(strategy.as_ref(), &splits, config.periods, &mut diagnostics);

    if scores.is_empty() {
        return Ok(None);
    }

    let n = scores.len() as f64;
    let mae = scores.iter().map(|s| s.mae).sum::<f64>() / n;
    let mse = scores.iter().map(|s| s.mse).sum::<f64>() / n;
    let mapes: Vec<f64> = scores.iter().filter_map(|s| s.mape).collect();
    let mape = if mapes.is_empty() {
        None
    } else {
        Some(mapes.iter().sum::<f64>() / mapes.len() as f64)
    };

    Ok(Some(AccuracyScore {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
    }))
}

fn validate(config: &ComparisonConfig) -> Result<()> {
    if config.periods == 0 {
        return Err(ForecastError::InvalidParameter(
            "periods must be positive".to_string(),
        ));
    }
    if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(
            "test_fraction must be in (0, 1)".to_string(),
        ));
    }
    Ok(())
}

fn split_groups<'a>(
    prepared: &'a PreparedData,
    test_fraction: f64,
    diagnostics: &mut Diagnostics,
) -> Vec<SplitGroup<'a>> {
    let mut splits = Vec::new();
    for series in prepared.series() {
        let n = series.len();
        if n < MIN_BACKTEST_PERIODS {
            diagnostics.push(Diagnostic {
                group: series.group().to_string(),
                model: None,
                reason: SkipReason::InsufficientHistory {
                    needed: MIN_BACKTEST_PERIODS,
                    got: n,
                },
            });
            continue;
        }

        let train_len = ((n as f64) * (1.0 - test_fraction)).floor() as usize;
        let actual = series.values()[train_len..].to_vec();
        splits.push(SplitGroup {
            series,
            train: series.truncate(train_len),
            actual,
        });
    }
    splits
}

fn score_strategy(
    strategy: &dyn Strategy,
    splits: &[SplitGroup<'_>],
    periods: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<ModelScore> {
    let mut scores = Vec::new();
    for split in splits {
        let needed = strategy.min_history();
        if split.train.len() < needed {
            diagnostics.push(Diagnostic {
                group: split.series.group().to_string(),
                model: Some(strategy.kind()),
                reason: SkipReason::InsufficientHistory {
                    needed,
                    got: split.train.len(),
                },
            });
            continue;
        }

        match strategy.forecast_series(&split.train, periods) {
            Ok(points) => {
                let steps = split.actual.len().min(points.len());
                if steps == 0 {
                    continue;
                }
                let predicted: Vec<f64> = points[..steps].iter().map(|p| p.value).collect();
                match score(&split.actual[..steps], &predicted) {
                    Ok(accuracy) => scores.push(ModelScore {
                        model: strategy.kind(),
                        group: split.series.group().to_string(),
                        mae: accuracy.mae,
                        mse: accuracy.mse,
                        rmse: accuracy.rmse,
                        mape: accuracy.mape,
                        test_periods: steps,
                    }),
                    Err(err) => diagnostics.push(Diagnostic {
                        group: split.series.group().to_string(),
                        model: Some(strategy.kind()),
                        reason: SkipReason::StrategyFailure(err.to_string()),
                    }),
                }
            }
            Err(err) => diagnostics.push(Diagnostic {
                group: split.series.group().to_string(),
                model: Some(strategy.kind()),
                reason: SkipReason::StrategyFailure(err.to_string()),
            }),
        }
    }
    scores
}

/// Argmin per metric over the group-mean score of each model.
fn recommend(scores: &[ModelScore]) -> Recommendations {
    let mut by_model: BTreeMap<ModelKind, Vec<&ModelScore>> = BTreeMap::new();
    for score in scores {
        by_model.entry(score.model).or_default().push(score);
    }

    let argmin = |metric: &dyn Fn(&[&ModelScore]) -> Option<f64>| -> Option<ModelKind> {
        let mut best: Option<(ModelKind, f64)> = None;
        for kind in ModelKind::ALL {
            if let Some(rows) = by_model.get(&kind) {
                if let Some(value) = metric(rows) {
                    match best {
                        Some((_, current)) if value >= current => {}
                        _ => best = Some((kind, value)),
                    }
                }
            }
        }
        best.map(|(kind, _)| kind)
    };

    let mean_of = |values: Vec<f64>| -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    };

    Recommendations {
        by_mae: argmin(&|rows| mean_of(rows.iter().map(|s| s.mae).collect())),
        by_rmse: argmin(&|rows| mean_of(rows.iter().map(|s| s.rmse).collect())),
        by_mape: argmin(&|rows| mean_of(rows.iter().filter_map(|s| s.mape).collect())),
    }
}

/// Per-group historical trend summary.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTrend {
    pub group: String,
    pub first_value: f64,
    pub last_value: f64,
    pub total_change: f64,
    /// Total change relative to the first value, in percent (0 when the
    /// first value is 0).
    pub percent_change: f64,
    /// Average month-over-month growth in percent, over months with a
    /// non-zero predecessor.
    pub avg_monthly_growth: f64,
    pub observations: usize,
}

/// Summarize the historical trend of every group with at least 3 periods.
pub fn trend_analysis(prepared: &PreparedData) -> Vec<GroupTrend> {
    let mut trends = Vec::new();
    for series in prepared.series() {
        let values = series.values();
        if values.len() < 3 {
            continue;
        }

        let first_value = values[0];
        let last_value = values[values.len() - 1];
        let total_change = last_value - first_value;
        let percent_change = if first_value != 0.0 {
            total_change / first_value * 100.0
        } else {
            0.0
        };

        let growths: Vec<f64> = values
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0] * 100.0)
            .collect();
        let avg_monthly_growth = if growths.is_empty() {
            0.0
        } else {
            growths.iter().sum::<f64>() / growths.len() as f64
        };

        trends.push(GroupTrend {
            group: series.group().to_string(),
            first_value,
            last_value,
            total_change,
            percent_change,
            avg_monthly_growth,
            observations: values.len(),
        });
    }
    trends
}
