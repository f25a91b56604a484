//! Data preparation: tabular input, aggregation, and feature derivation.
//!
//! The loading layer (database, CSV, dashboard state) hands over a
//! [`MetricFrame`]; [`prepare`] turns it into one ordered, feature-enriched
//! series per group. Pure transform, no side effects.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::core::{PreparedData, PreparedSeries};
use crate::error::{ForecastError, Result};

/// Group key used when no grouping column is requested.
pub const DEFAULT_GROUP: &str = "all";

/// Column-oriented input table.
///
/// Holds a date column, an optional categorical group column, and one or
/// more named numeric metric columns. Daily and pre-aggregated monthly
/// granularity are both accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricFrame {
    dates: Option<Vec<NaiveDate>>,
    group: Option<(String, Vec<String>)>,
    metrics: BTreeMap<String, Vec<f64>>,
}

/// Builder for constructing a [`MetricFrame`].
#[derive(Debug, Clone, Default)]
pub struct MetricFrameBuilder {
    dates: Option<Vec<NaiveDate>>,
    group: Option<(String, Vec<String>)>,
    metrics: BTreeMap<String, Vec<f64>>,
}

impl MetricFrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date column.
    pub fn dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.dates = Some(dates);
        self
    }

    /// Set the categorical group column.
    pub fn group_column(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.group = Some((name.into(), values));
        self
    }

    /// Add a numeric metric column.
    pub fn metric(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.metrics.insert(name.into(), values);
        self
    }

    /// Validate column lengths and build the frame.
    pub fn build(self) -> Result<MetricFrame> {
        let expected = self
            .dates
            .as_ref()
            .map(|d| d.len())
            .or_else(|| self.group.as_ref().map(|(_, v)| v.len()))
            .or_else(|| self.metrics.values().next().map(|v| v.len()));

        if let Some(expected) = expected {
            if let Some((_, values)) = &self.group {
                if values.len() != expected {
                    return Err(ForecastError::DimensionMismatch {
                        expected,
                        got: values.len(),
                    });
                }
            }
            for values in self.metrics.values() {
                if values.len() != expected {
                    return Err(ForecastError::DimensionMismatch {
                        expected,
                        got: values.len(),
                    });
                }
            }
        }

        Ok(MetricFrame {
            dates: self.dates,
            group: self.group,
            metrics: self.metrics,
        })
    }
}

impl MetricFrame {
    /// Create a builder.
    pub fn builder() -> MetricFrameBuilder {
        MetricFrameBuilder::new()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.as_ref().map(|d| d.len()).unwrap_or(0)
    }

    /// Check if the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the numeric metric columns.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(|k| k.as_str())
    }

    fn metric(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

/// Aggregate a frame into one prepared series per group.
///
/// Requires the date column and `value_field`; fails with
/// [`ForecastError::MissingColumns`] naming every absent column. Rows
/// sharing a (date, group) pair are aggregated by **sum**: the metrics are
/// additive, so a mean would understate them.
pub fn prepare(
    frame: &MetricFrame,
    group_by: Option<&str>,
    value_field: &str,
) -> Result<PreparedData> {
    prepare_with_secondary(frame, group_by, value_field, None)
}

/// Like [`prepare`], carrying a second metric column through aggregation.
pub fn prepare_with_secondary(
    frame: &MetricFrame,
    group_by: Option<&str>,
    value_field: &str,
    secondary_field: Option<&str>,
) -> Result<PreparedData> {
    let mut missing = Vec::new();
    if frame.dates.is_none() {
        missing.push("date".to_string());
    }
    if frame.metric(value_field).is_none() {
        missing.push(value_field.to_string());
    }
    if let Some(requested) = group_by {
        match &frame.group {
            Some((name, _)) if name == requested => {}
            _ => missing.push(requested.to_string()),
        }
    }
    if let Some(field) = secondary_field {
        if frame.metric(field).is_none() {
            missing.push(field.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(ForecastError::MissingColumns { columns: missing });
    }

    let (dates, values) = match (frame.dates.as_ref(), frame.metric(value_field)) {
        (Some(dates), Some(values)) => (dates, values),
        _ => {
            return Err(ForecastError::MissingColumns {
                columns: vec!["date".to_string(), value_field.to_string()],
            })
        }
    };
    if dates.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    let secondary = secondary_field.and_then(|f| frame.metric(f));

    // Aggregate by (group, date); BTreeMap keys keep dates strictly
    // increasing per group.
    let mut grouped: BTreeMap<String, BTreeMap<NaiveDate, (f64, f64)>> = BTreeMap::new();
    for (i, (&date, &value)) in dates.iter().zip(values.iter()).enumerate() {
        let key = match (group_by, &frame.group) {
            (Some(_), Some((_, groups))) => groups[i].clone(),
            _ => DEFAULT_GROUP.to_string(),
        };
        let entry = grouped
            .entry(key)
            .or_default()
            .entry(date)
            .or_insert((0.0, 0.0));
        entry.0 += value;
        if let Some(secondary) = secondary {
            entry.1 += secondary[i];
        }
    }

    let mut series = Vec::with_capacity(grouped.len());
    for (group, by_date) in grouped {
        let observations: Vec<_> = by_date
            .into_iter()
            .map(|(date, (value, sec))| {
                (date, value, secondary_field.map(|_| sec))
            })
            .collect();
        series.push(PreparedSeries::from_observations(
            group,
            value_field,
            observations,
        )?);
    }

    Ok(PreparedData::new(series))
}
