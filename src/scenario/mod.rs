//! Scenario synthesis: optimistic/base/conservative growth narratives.
//!
//! Scenarios are derived on demand from a forecast summary (or per-type
//! defaults when no forecast exists), a horizon adjustment, and fixed
//! per-type offsets. The offsets, defaults, and thresholds are planning
//! constants from the business side; they are not estimated.

mod narrative;

use std::fmt;
use std::str::FromStr;

use crate::core::ForecastSummary;
use crate::error::ForecastError;
use crate::models::ModelKind;

/// Lower clamp on forecast-derived base growth, in percent.
const GROWTH_FLOOR: f64 = -50.0;
/// Upper clamp on forecast-derived base growth, in percent.
const GROWTH_CEILING: f64 = 100.0;
/// Horizon the adjustment is neutral at, in months.
const BASELINE_HORIZON_MONTHS: f64 = 12.0;
/// Adjustment gained per month beyond the baseline horizon.
const HORIZON_STEP: f64 = 0.01;
/// Scenario range above which risk is classified Higher.
const HIGHER_RISK_RANGE: f64 = 30.0;
/// Scenario range above which risk is classified Moderate.
const MODERATE_RISK_RANGE: f64 = 15.0;

/// The business metric families scenarios are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastType {
    Revenue,
    Demand,
    Esg,
    CustomerBehavior,
}

impl ForecastType {
    /// Dashboard label.
    pub fn label(&self) -> &'static str {
        match self {
            ForecastType::Revenue => "Revenue Forecasting",
            ForecastType::Demand => "Demand Planning",
            ForecastType::Esg => "ESG Trajectory",
            ForecastType::CustomerBehavior => "Customer Behavior",
        }
    }

    /// Metric name shown next to scenario figures.
    pub fn metric_label(&self) -> &'static str {
        match self {
            ForecastType::Revenue => "Revenue",
            ForecastType::Demand => "Units Sold",
            ForecastType::Esg => "Sustainability Score",
            ForecastType::CustomerBehavior => "Engagement Index",
        }
    }

    /// How scenario figures should be formatted.
    pub fn metric_format(&self) -> MetricFormat {
        match self {
            ForecastType::Revenue => MetricFormat::Currency,
            ForecastType::Demand => MetricFormat::Count,
            ForecastType::Esg => MetricFormat::Score,
            ForecastType::CustomerBehavior => MetricFormat::Index,
        }
    }

    /// Base growth assumed when no forecast is available, in percent.
    fn default_growth(&self) -> f64 {
        match self {
            ForecastType::Revenue => 12.0,
            ForecastType::Demand => 8.0,
            ForecastType::Esg => 15.0,
            ForecastType::CustomerBehavior => 6.0,
        }
    }

    /// Additive percentage-point offsets (optimistic, base, conservative).
    fn offsets(&self) -> (f64, f64, f64) {
        match self {
            ForecastType::Revenue | ForecastType::Demand => (5.0, 0.0, -5.0),
            ForecastType::Esg => (4.0, 0.0, -3.0),
            ForecastType::CustomerBehavior => (3.0, 0.0, -4.0),
        }
    }
}

impl fmt::Display for ForecastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ForecastType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revenue forecasting" | "revenue" => Ok(ForecastType::Revenue),
            "demand planning" | "demand" => Ok(ForecastType::Demand),
            "esg trajectory" | "esg" => Ok(ForecastType::Esg),
            "customer behavior" | "customer_behavior" => Ok(ForecastType::CustomerBehavior),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown forecast type: {other}"
            ))),
        }
    }
}

/// Display format of a scenario metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFormat {
    Currency,
    Count,
    Score,
    Index,
}

/// The three scenario bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioBand {
    Optimistic,
    Base,
    Conservative,
}

/// Risk classification derived from the optimistic/conservative spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Higher,
    Moderate,
    Lower,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Higher => "Higher",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Lower => "Lower",
        }
    }

    fn from_range(range: f64) -> Self {
        if range > HIGHER_RISK_RANGE {
            RiskLevel::Higher
        } else if range > MODERATE_RISK_RANGE {
            RiskLevel::Moderate
        } else {
            RiskLevel::Lower
        }
    }
}

/// Fixed confidence classification per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelConfidence {
    High,
    Moderate,
}

impl ModelConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelConfidence::High => "High",
            ModelConfidence::Moderate => "Moderate",
        }
    }

    fn for_model(model: ModelKind) -> Self {
        match model {
            ModelKind::ExponentialSmoothing | ModelKind::ExternalSeasonal => ModelConfidence::High,
            ModelKind::MovingAverage | ModelKind::TrendRegression => ModelConfidence::Moderate,
        }
    }
}

/// One named growth scenario with its planning narrative.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Projected growth over the horizon, in percent.
    pub growth_pct: f64,
    /// Ordered narrative conditions (static business copy).
    pub conditions: Vec<String>,
    /// Metric name shown with the figure.
    pub metric_label: String,
    /// Display format of the figure.
    pub metric_format: MetricFormat,
}

/// Derived figures shared by the three scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioMetadata {
    pub base_growth: f64,
    pub horizon_adjustment: f64,
    pub risk_level: RiskLevel,
    pub model_confidence: ModelConfidence,
    /// `optimistic.growth_pct - conservative.growth_pct`.
    pub scenario_range: f64,
}

/// The full scenario response: three bands plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet {
    pub optimistic: Scenario,
    pub base: Scenario,
    pub conservative: Scenario,
    pub metadata: ScenarioMetadata,
}

impl ScenarioSet {
    /// Access one band by name.
    pub fn band(&self, band: ScenarioBand) -> &Scenario {
        match band {
            ScenarioBand::Optimistic => &self.optimistic,
            ScenarioBand::Base => &self.base,
            ScenarioBand::Conservative => &self.conservative,
        }
    }
}

/// Synthesize optimistic/base/conservative scenarios for a forecast.
///
/// `summary` carries the forecast-vs-recent-history means (see
/// [`crate::core::ForecastBatch::summary`]); without one, or with a
/// non-positive recent mean, the per-type default growth applies.
pub fn scenarios(
    forecast_type: ForecastType,
    horizon_months: u32,
    summary: Option<&ForecastSummary>,
    model: ModelKind,
) -> ScenarioSet {
    let base_growth = match summary {
        Some(s) if s.recent_actual_mean > 0.0 => {
            let delta = (s.forecast_mean - s.recent_actual_mean) / s.recent_actual_mean * 100.0;
            delta.clamp(GROWTH_FLOOR, GROWTH_CEILING)
        }
        _ => forecast_type.default_growth(),
    };

    let horizon_adjustment = 1.0 + (horizon_months as f64 - BASELINE_HORIZON_MONTHS) * HORIZON_STEP;

    let (optimistic_offset, base_offset, conservative_offset) = forecast_type.offsets();
    let build = |band: ScenarioBand, offset: f64| Scenario {
        growth_pct: base_growth + offset * horizon_adjustment,
        conditions: narrative::conditions(forecast_type, band)
            .iter()
            .map(|s| s.to_string())
            .collect(),
        metric_label: forecast_type.metric_label().to_string(),
        metric_format: forecast_type.metric_format(),
    };

    let optimistic = build(ScenarioBand::Optimistic, optimistic_offset);
    let base = build(ScenarioBand::Base, base_offset);
    let conservative = build(ScenarioBand::Conservative, conservative_offset);

    let scenario_range = optimistic.growth_pct - conservative.growth_pct;
    let metadata = ScenarioMetadata {
        base_growth,
        horizon_adjustment,
        risk_level: RiskLevel::from_range(scenario_range),
        model_confidence: ModelConfidence::for_model(model),
        scenario_range,
    };

    ScenarioSet {
        optimistic,
        base,
        conservative,
        metadata,
    }
}
