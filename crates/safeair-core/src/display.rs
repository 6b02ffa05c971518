//! Text helpers shared by every listing.

use time::OffsetDateTime;

use safeair_types::{GeoLocation, parse_timestamp};

/// Relative age of a timestamp: `12s ago`, `5m ago`, `3h ago`, else the date.
///
/// Absent timestamps read "Never"; unparseable ones are returned verbatim.
#[must_use]
pub fn relative_time(timestamp: Option<&str>, now: OffsetDateTime) -> String {
    let Some(raw) = timestamp else {
        return "Never".to_string();
    };
    let Some(then) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let seconds = (now - then).whole_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if seconds < 60 {
        format!("{seconds}s ago")
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        let date = then.date();
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }
}

/// A ppm value rounded to an integer, or `-`.
#[must_use]
pub fn format_ppm(ppm: Option<f64>) -> String {
    match ppm {
        Some(value) if value.is_finite() => format!("{}", value.round()),
        _ => "-".to_string(),
    }
}

/// Latitude or longitude to six decimals, or `-`.
#[must_use]
pub fn format_coordinate(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.6}"))
}

/// `lat, lng` to six decimals, or `-`.
#[must_use]
pub fn format_location(location: Option<&GeoLocation>) -> String {
    location.map_or_else(|| "-".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-01-12 12:00:00 UTC);

    #[test]
    fn test_relative_time_buckets() {
        assert_eq!(relative_time(Some("2025-01-12T11:59:48Z"), NOW), "12s ago");
        assert_eq!(relative_time(Some("2025-01-12T11:55:00Z"), NOW), "5m ago");
        assert_eq!(relative_time(Some("2025-01-12T09:00:00Z"), NOW), "3h ago");
        assert_eq!(relative_time(Some("2025-01-10T09:00:00Z"), NOW), "2025-01-10");
    }

    #[test]
    fn test_relative_time_edge_cases() {
        assert_eq!(relative_time(None, NOW), "Never");
        assert_eq!(relative_time(Some("soon"), NOW), "soon");
        assert_eq!(relative_time(Some("2025-01-12T12:00:30Z"), NOW), "0s ago");
        assert_eq!(relative_time(Some("2025-01-12T11:00:00"), NOW), "1h ago");
    }

    #[test]
    fn test_format_ppm() {
        assert_eq!(format_ppm(Some(741.6)), "742");
        assert_eq!(format_ppm(None), "-");
        assert_eq!(format_ppm(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinate(Some(6.9271)), "6.927100");
        assert_eq!(format_coordinate(None), "-");
        assert_eq!(
            format_location(Some(&GeoLocation::new(6.9271, 79.8612))),
            "6.927100, 79.861200"
        );
        assert_eq!(format_location(None), "-");
    }
}
