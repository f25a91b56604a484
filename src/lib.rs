//! # ecometrics-forecast
//!
//! Time series forecasting engine for monthly business metrics (revenue,
//! unit demand, ESG indicators, customer-behavior proxies).
//!
//! The crate turns a tabular metric history into per-group projections,
//! evaluates competing strategies against held-out history, and synthesizes
//! optimistic/base/conservative planning scenarios from a chosen forecast.
//! Loading and rendering stay outside: callers hand in a
//! [`prepare::MetricFrame`] and consume a [`pipeline::ForecastReport`].
//!
//! All operations are synchronous and pure over in-memory data; per-group
//! issues are returned as structured diagnostics rather than raised.

pub mod chart;
pub mod core;
pub mod error;
pub mod evaluate;
pub mod models;
pub mod pipeline;
pub mod prepare;
pub mod scenario;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::chart::{render, ChartSpec};
    pub use crate::core::{ForecastBatch, ForecastPoint, PreparedData, PreparedSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::evaluate::{compare, ComparisonConfig, ModelComparison};
    pub use crate::models::{available_models, forecast_all, ModelKind, Strategy};
    pub use crate::pipeline::{forecast_with_report, ForecastReport};
    pub use crate::prepare::{prepare, MetricFrame};
    pub use crate::scenario::{scenarios, ForecastType, ScenarioSet};
}
