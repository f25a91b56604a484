//! Chart handle: the data the rendering layer needs, nothing more.
//!
//! Actual drawing happens outside this crate. The handle produced here
//! guarantees the visual contract: one consistent color per group across
//! history and forecast, and a forecast segment that starts at the last
//! historical point so the two lines connect without a gap.

use chrono::NaiveDate;

use crate::core::{ForecastPoint, PreparedData};

/// Fixed categorical palette, assigned to groups in order.
const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

/// Which half of a group's line a series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSegment {
    Historical,
    Forecast,
}

/// One polyline of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub group: String,
    pub color: &'static str,
    pub segment: ChartSegment,
    pub points: Vec<(NaiveDate, f64)>,
}

/// The full chart handle handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSpec {
    pub series: Vec<ChartSeries>,
}

impl ChartSpec {
    /// All series for one group.
    pub fn series_for<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a ChartSeries> {
        self.series.iter().filter(move |s| s.group == group)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Build the chart handle for a prepared history and its forecast points.
pub fn render(prepared: &PreparedData, forecast: &[ForecastPoint]) -> ChartSpec {
    let mut series = Vec::new();

    for (i, prepared_series) in prepared.series().iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let group = prepared_series.group();

        let historical: Vec<(NaiveDate, f64)> = prepared_series
            .points()
            .iter()
            .map(|p| (p.date, p.value))
            .collect();
        let last_historical = historical.last().copied();
        series.push(ChartSeries {
            group: group.to_string(),
            color,
            segment: ChartSegment::Historical,
            points: historical,
        });

        let mut group_forecast: Vec<&ForecastPoint> =
            forecast.iter().filter(|p| p.group == group).collect();
        if group_forecast.is_empty() {
            continue;
        }
        group_forecast.sort_by_key(|p| p.period);

        // Seed with the last actual so the segments connect.
        let mut points = Vec::with_capacity(group_forecast.len() + 1);
        if let Some(seam) = last_historical {
            points.push(seam);
        }
        points.extend(group_forecast.iter().map(|p| (p.date, p.value)));

        series.push(ChartSeries {
            group: group.to_string(),
            color,
            segment: ChartSegment::Forecast,
            points,
        });
    }

    ChartSpec { series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PreparedData, PreparedSeries};
    use crate::models::ModelKind;
    use chrono::Months;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_prepared(groups: &[(&str, &[f64])]) -> PreparedData {
        let series = groups
            .iter()
            .map(|(group, values)| {
                let observations: Vec<_> = values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let date = ymd(2023, 1, 1)
                            .checked_add_months(Months::new(i as u32))
                            .unwrap();
                        (date, v, None)
                    })
                    .collect();
                PreparedSeries::from_observations(*group, "revenue", observations).unwrap()
            })
            .collect();
        PreparedData::new(series)
    }

    fn forecast_point(group: &str, period: usize, value: f64) -> ForecastPoint {
        ForecastPoint {
            date: ymd(2023, 12, 1)
                .checked_add_months(Months::new(period as u32))
                .unwrap(),
            group: group.to_string(),
            value,
            period,
            model: ModelKind::MovingAverage,
            lower: None,
            upper: None,
        }
    }

    #[test]
    fn forecast_segment_starts_at_the_last_historical_point() {
        let prepared = make_prepared(&[("A", &[10.0, 20.0, 30.0])]);
        let forecast = vec![forecast_point("A", 1, 32.0), forecast_point("A", 2, 34.0)];

        let spec = render(&prepared, &forecast);

        let segments: Vec<_> = spec.series_for("A").collect();
        assert_eq!(segments.len(), 2);

        let historical = segments
            .iter()
            .find(|s| s.segment == ChartSegment::Historical)
            .unwrap();
        let forecast_series = segments
            .iter()
            .find(|s| s.segment == ChartSegment::Forecast)
            .unwrap();

        assert_eq!(
            forecast_series.points.first(),
            historical.points.last(),
            "segments must connect with no gap"
        );
        assert_eq!(forecast_series.points.len(), 3);
    }

    #[test]
    fn groups_keep_one_color_across_segments() {
        let prepared = make_prepared(&[("A", &[1.0, 2.0, 3.0]), ("B", &[4.0, 5.0, 6.0])]);
        let forecast = vec![forecast_point("A", 1, 3.5), forecast_point("B", 1, 6.5)];

        let spec = render(&prepared, &forecast);

        for group in ["A", "B"] {
            let colors: Vec<_> = spec.series_for(group).map(|s| s.color).collect();
            assert_eq!(colors.len(), 2);
            assert_eq!(colors[0], colors[1]);
        }
        let a_color = spec.series_for("A").next().unwrap().color;
        let b_color = spec.series_for("B").next().unwrap().color;
        assert_ne!(a_color, b_color);
    }

    #[test]
    fn groups_without_forecast_only_get_history() {
        let prepared = make_prepared(&[("A", &[1.0, 2.0, 3.0]), ("B", &[4.0, 5.0, 6.0])]);
        let forecast = vec![forecast_point("A", 1, 3.5)];

        let spec = render(&prepared, &forecast);

        assert_eq!(spec.series_for("A").count(), 2);
        assert_eq!(spec.series_for("B").count(), 1);
    }
}
