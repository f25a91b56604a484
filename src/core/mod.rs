//! Core data structures: prepared series and forecast results.

pub mod forecast;
pub mod series;

pub use forecast::{
    Diagnostic, Diagnostics, ForecastBatch, ForecastPoint, ForecastSummary, SkipReason,
    RECENT_HISTORY_WINDOW,
};
pub use series::{
    PreparedData, PreparedPoint, PreparedSeries, LONG_ROLLING_WINDOW, SHORT_ROLLING_WINDOW,
};
