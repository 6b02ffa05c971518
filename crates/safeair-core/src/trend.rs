//! Hourly trend queries and bar-chart helpers.
//!
//! The trend endpoint is queried either for a named day (`?day=Monday`) or for
//! an inclusive date range (`?startDate=2025-01-01&endDate=2025-01-07`). The two
//! modes are mutually exclusive, and a range with a missing bound is never sent.

use std::fmt;

use time::Date;
use time::macros::format_description;

use safeair_types::{
    DeviceTrend, HourlyPpmPoint, Severity, TrendResponse, ValidationError, ValidationResult,
};

use crate::thresholds::Thresholds;

/// Days offered when the backend does not list any.
pub const FALLBACK_DAYS: [&str; 8] = [
    "Today",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Query mode for `GET /api/dashboard/device-locations`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrendQuery {
    /// No parameters; the backend picks the current day.
    #[default]
    Latest,
    /// A named day such as "Today" or "Monday".
    Day(String),
    /// An inclusive date range.
    Range { start: Date, end: Date },
}

impl TrendQuery {
    /// Query a named day.
    pub fn day(name: impl Into<String>) -> Self {
        TrendQuery::Day(name.into())
    }

    /// Query a date range.
    ///
    /// Returns `None` unless both bounds are present.
    #[must_use]
    pub fn range(start: Option<Date>, end: Option<Date>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(TrendQuery::Range { start, end }),
            _ => None,
        }
    }

    /// Parse a `YYYY-MM-DD` date.
    pub fn parse_date(value: &str) -> ValidationResult<Date> {
        Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(|_| ValidationError::InvalidDate(value.to_string()))
    }

    /// Query-string pairs for this mode.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            TrendQuery::Latest => Vec::new(),
            TrendQuery::Day(day) => vec![("day", day.clone())],
            TrendQuery::Range { start, end } => vec![
                ("startDate", format_date(*start)),
                ("endDate", format_date(*end)),
            ],
        }
    }
}

impl fmt::Display for TrendQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendQuery::Latest => f.write_str("latest"),
            TrendQuery::Day(day) => f.write_str(day),
            TrendQuery::Range { start, end } => {
                write!(f, "{} to {}", format_date(*start), format_date(*end))
            }
        }
    }
}

fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Days to offer in a day selector.
#[must_use]
pub fn available_days(response: &TrendResponse) -> Vec<String> {
    if response.available_days.is_empty() {
        FALLBACK_DAYS.iter().map(|d| (*d).to_string()).collect()
    } else {
        response.available_days.clone()
    }
}

/// The day after (or before) `current` in `days`, wrapping around.
///
/// An unknown `current` selects the first day.
#[must_use]
pub fn cycle_day(days: &[String], current: &str, forward: bool) -> Option<String> {
    if days.is_empty() {
        return None;
    }
    let next = match days.iter().position(|d| d == current) {
        None => 0,
        Some(i) if forward => (i + 1) % days.len(),
        Some(i) => (i + days.len() - 1) % days.len(),
    };
    Some(days[next].clone())
}

/// Highest ppm value among `points`, or 0 when there are none.
#[must_use]
pub fn max_ppm(points: &[HourlyPpmPoint]) -> f64 {
    points.iter().map(|p| p.ppm_value).fold(0.0, f64::max)
}

/// The peak hour: the point flagged by the backend, else the highest one.
#[must_use]
pub fn peak_point(points: &[HourlyPpmPoint]) -> Option<&HourlyPpmPoint> {
    points.iter().find(|p| p.is_peak).or_else(|| {
        points
            .iter()
            .max_by(|a, b| a.ppm_value.total_cmp(&b.ppm_value))
    })
}

/// Severity of a device's peak hour. A peak of 0 means no data.
#[must_use]
pub fn peak_severity(device: &DeviceTrend, thresholds: &Thresholds) -> Severity {
    let max = max_ppm(&device.hourly_ppm_data);
    if max <= 0.0 {
        Severity::NoData
    } else {
        thresholds.classify(Some(max))
    }
}

/// Devices whose name, UID or id contain `query`, ignoring case.
///
/// A blank query matches every device.
#[must_use]
pub fn filter_devices<'a>(devices: &'a [DeviceTrend], query: &str) -> Vec<&'a DeviceTrend> {
    let needle = query.trim().to_lowercase();
    devices
        .iter()
        .filter(|d| {
            needle.is_empty()
                || d.name.to_lowercase().contains(&needle)
                || d.device_uid.to_lowercase().contains(&needle)
                || d.id.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Bar height as a percentage of the chart: `base + ratio * span`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarScale {
    /// Height of a zero-value bar.
    pub base: f64,
    /// Extra height of the tallest bar.
    pub span: f64,
}

impl BarScale {
    /// Scale used by the full trend panel.
    pub const TREND_PANEL: BarScale = BarScale {
        base: 10.0,
        span: 80.0,
    };

    /// Scale used by the compact per-device grid.
    pub const DEVICE_GRID: BarScale = BarScale {
        base: 8.0,
        span: 70.0,
    };

    /// Height of a bar for `value` when the tallest bar is `max`.
    ///
    /// Every bar is `base` when `max` is not positive.
    #[must_use]
    pub fn height(&self, value: f64, max: f64) -> f64 {
        if max > 0.0 && value.is_finite() {
            self.base + (value / max).clamp(0.0, 1.0) * self.span
        } else {
            self.base
        }
    }

    /// Height scaled to `rows` terminal rows, at least one row.
    #[must_use]
    pub fn rows(&self, value: f64, max: f64, rows: u16) -> u16 {
        let pct = self.height(value, max) / 100.0;
        ((pct * f64::from(rows)).round() as u16).clamp(1, rows.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::date;

    fn point(hour: u8, ppm: f64, is_peak: bool) -> HourlyPpmPoint {
        HourlyPpmPoint {
            time: format!("{hour:02}:00"),
            ppm_value: ppm,
            is_peak,
            hour,
        }
    }

    fn device(id: &str, name: &str, uid: &str, points: Vec<HourlyPpmPoint>) -> DeviceTrend {
        DeviceTrend {
            id: id.to_string(),
            name: name.to_string(),
            device_uid: uid.to_string(),
            status: "Active".to_string(),
            alert_level: "Normal".to_string(),
            latitude: None,
            longitude: None,
            hourly_ppm_data: points,
        }
    }

    #[test]
    fn test_query_pairs() {
        assert!(TrendQuery::Latest.query_pairs().is_empty());
        assert_eq!(
            TrendQuery::day("Monday").query_pairs(),
            vec![("day", "Monday".to_string())]
        );
        let range = TrendQuery::range(Some(date!(2025 - 01 - 01)), Some(date!(2025 - 01 - 07)))
            .unwrap();
        assert_eq!(
            range.query_pairs(),
            vec![
                ("startDate", "2025-01-01".to_string()),
                ("endDate", "2025-01-07".to_string())
            ]
        );
        assert_eq!(range.to_string(), "2025-01-01 to 2025-01-07");
    }

    #[test]
    fn test_range_requires_both_bounds() {
        assert!(TrendQuery::range(Some(date!(2025 - 01 - 01)), None).is_none());
        assert!(TrendQuery::range(None, Some(date!(2025 - 01 - 01))).is_none());
        assert!(TrendQuery::range(None, None).is_none());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            TrendQuery::parse_date("2025-03-09").unwrap(),
            date!(2025 - 03 - 09)
        );
        assert!(matches!(
            TrendQuery::parse_date("09/03/2025"),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_available_days_fallback() {
        let empty = TrendResponse::default();
        let days = available_days(&empty);
        assert_eq!(days.len(), 8);
        assert_eq!(days[0], "Today");
        assert_eq!(days[7], "Sunday");

        let response = TrendResponse {
            available_days: vec!["Today".into(), "Friday".into()],
            ..Default::default()
        };
        assert_eq!(available_days(&response), vec!["Today", "Friday"]);
    }

    #[test]
    fn test_cycle_day_wraps() {
        let days: Vec<String> = ["Today", "Monday", "Tuesday"]
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(cycle_day(&days, "Today", true).as_deref(), Some("Monday"));
        assert_eq!(cycle_day(&days, "Tuesday", true).as_deref(), Some("Today"));
        assert_eq!(cycle_day(&days, "Today", false).as_deref(), Some("Tuesday"));
        assert_eq!(cycle_day(&days, "Unknown", true).as_deref(), Some("Today"));
        assert_eq!(cycle_day(&[], "Today", true), None);
    }

    #[test]
    fn test_max_ppm_and_peak() {
        assert_eq!(max_ppm(&[]), 0.0);
        let points = vec![point(8, 640.0, false), point(9, 1132.0, false), point(10, 900.0, true)];
        assert_eq!(max_ppm(&points), 1132.0);
        assert_eq!(peak_point(&points).map(|p| p.hour), Some(10));

        let unflagged = vec![point(8, 640.0, false), point(9, 1132.0, false)];
        assert_eq!(peak_point(&unflagged).map(|p| p.hour), Some(9));
        assert!(peak_point(&[]).is_none());
    }

    #[test]
    fn test_peak_severity() {
        let thresholds = Thresholds::default();
        let empty = device("1", "Empty", "SAT-1", vec![]);
        assert_eq!(peak_severity(&empty, &thresholds), Severity::NoData);

        let zeros = device("2", "Zeros", "SAT-2", vec![point(1, 0.0, false)]);
        assert_eq!(peak_severity(&zeros, &thresholds), Severity::NoData);

        let high = device("3", "Plant", "SAT-3", vec![point(9, 1132.0, true)]);
        assert_eq!(peak_severity(&high, &thresholds), Severity::High);
    }

    #[test]
    fn test_filter_devices() {
        let devices = vec![
            device("loc-1", "Industrial Plant", "SAT-0001", vec![]),
            device("loc-2", "City Office", "SAT-0002", vec![]),
        ];
        assert_eq!(filter_devices(&devices, "").len(), 2);
        assert_eq!(filter_devices(&devices, "   ").len(), 2);
        assert_eq!(filter_devices(&devices, "plant")[0].id, "loc-1");
        assert_eq!(filter_devices(&devices, "sat-0002")[0].id, "loc-2");
        assert_eq!(filter_devices(&devices, "LOC-").len(), 2);
        assert!(filter_devices(&devices, "warehouse").is_empty());
    }

    #[test]
    fn test_bar_heights() {
        let scale = BarScale::TREND_PANEL;
        assert_eq!(scale.height(1000.0, 1000.0), 90.0);
        assert_eq!(scale.height(500.0, 1000.0), 50.0);
        assert_eq!(scale.height(0.0, 1000.0), 10.0);
        assert_eq!(scale.height(500.0, 0.0), 10.0);

        let grid = BarScale::DEVICE_GRID;
        assert_eq!(grid.height(1000.0, 1000.0), 78.0);
        assert_eq!(grid.height(0.0, 0.0), 8.0);
    }

    #[test]
    fn test_bar_rows() {
        let scale = BarScale::TREND_PANEL;
        assert_eq!(scale.rows(1000.0, 1000.0, 10), 9);
        assert_eq!(scale.rows(0.0, 1000.0, 10), 1);
        assert_eq!(scale.rows(0.0, 0.0, 0), 1);
    }

    proptest! {
        #[test]
        fn prop_bar_height_within_bounds(value in 0.0f64..5000.0, max in 0.0f64..5000.0) {
            let scale = BarScale::TREND_PANEL;
            let h = scale.height(value.min(max), max);
            prop_assert!(h >= scale.base);
            prop_assert!(h <= scale.base + scale.span);
        }
    }
}
