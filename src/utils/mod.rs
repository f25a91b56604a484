//! Utility functions shared by the forecasting strategies and evaluator.

pub mod least_squares;
pub mod metrics;
pub mod stats;

pub use least_squares::{least_squares, LinearFit};
pub use metrics::{score, AccuracyScore};
pub use stats::{mean, std_dev, variance};
