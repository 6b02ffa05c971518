//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use owo_colors::OwoColorize;
use safeair_core::display::{format_coordinate, format_location, format_ppm, relative_time};
use safeair_core::map::MapMarker;
use safeair_core::trend::{filter_devices, max_ppm, peak_point, peak_severity};
use safeair_core::{FleetStats, MapView, Thresholds};
use safeair_types::{DeviceSummary, DeviceTrend, RegisteredDevice, TrendResponse};
use serde::Serialize;
use tabled::builder::Builder;
use time::OffsetDateTime;

use crate::cli::StyleMode;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Visual styling mode.
    pub style: StyleMode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_color: false,
            no_header: false,
            compact: false,
            style: StyleMode::Rich,
        }
    }
}

impl FormatOptions {
    pub fn new(no_color: bool, style: StyleMode) -> Self {
        // Plain mode automatically disables colors for pipe-friendliness
        Self {
            no_color: no_color || style == StyleMode::Plain,
            style,
            ..Self::default()
        }
    }

    /// Check if rich styling is enabled.
    pub fn is_rich(&self) -> bool {
        self.style == StyleMode::Rich
    }

    /// Create with no_header option for CSV output.
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    fn header(&self, line: &str) -> String {
        if self.no_header {
            String::new()
        } else {
            format!("{}\n", line)
        }
    }
}

/// Escape a string for CSV output.
/// Wraps the value in quotes if it contains commas, quotes, or newlines.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ============================================================================
// Devices
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceRow<'a> {
    id: i64,
    device_uid: &'a str,
    co2: Option<f64>,
    severity: &'static str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    recorded_at: Option<&'a str>,
    registered_at: &'a str,
}

fn device_row<'a>(device: &'a DeviceSummary, thresholds: &Thresholds) -> DeviceRow<'a> {
    DeviceRow {
        id: device.id,
        device_uid: &device.device_uid,
        co2: device.latest_co2,
        severity: thresholds.classify(device.latest_co2).slug(),
        latitude: device.location.map(|l| l.latitude),
        longitude: device.location.map(|l| l.longitude),
        recorded_at: device.latest_recorded_at.as_deref(),
        registered_at: &device.registered_at,
    }
}

#[must_use]
pub fn format_devices_text(
    devices: &[DeviceSummary],
    thresholds: &Thresholds,
    now: OffsetDateTime,
    opts: &FormatOptions,
) -> String {
    if devices.is_empty() {
        return "No devices registered.\n".to_string();
    }

    let (with_data, without_data): (Vec<&DeviceSummary>, Vec<&DeviceSummary>) =
        devices.iter().partition(|d| d.has_data());

    let mut output = String::new();

    if opts.is_rich() {
        output.push_str(&style::format_title(
            &format!("Live devices ({})", with_data.len()),
            opts.no_color,
        ));
        output.push('\n');
    } else {
        output.push_str(&format!("Live devices ({}):\n", with_data.len()));
    }

    if with_data.is_empty() {
        output.push_str("No devices have reported a reading yet.\n");
    } else {
        let mut builder = Builder::default();
        builder.push_record(["Device", "CO2 (ppm)", "Status", "Latitude", "Longitude", "Updated"]);
        for device in &with_data {
            let severity = thresholds.classify(device.latest_co2);
            let uid = if opts.no_color {
                device.device_uid.clone()
            } else {
                format!("{}", device.device_uid.cyan())
            };
            builder.push_record([
                uid,
                style::format_ppm_colored(device.latest_co2, severity, opts.no_color),
                style::format_severity_badge(severity, opts.no_color),
                format_coordinate(device.location.map(|l| l.latitude)),
                format_coordinate(device.location.map(|l| l.longitude)),
                relative_time(device.latest_recorded_at.as_deref(), now),
            ]);
        }
        let mut table = builder.build();
        style::apply_table_style(&mut table, opts.style);
        output.push_str(&table.to_string());
        output.push('\n');
    }

    if !without_data.is_empty() {
        output.push('\n');
        output.push_str(&format!("Devices without data ({}):\n", without_data.len()));
        let mut builder = Builder::default();
        builder.push_record(["Device", "Location", "Registered"]);
        for device in &without_data {
            builder.push_record([
                device.device_uid.clone(),
                format_location(device.location.as_ref()),
                relative_time(Some(device.registered_at.as_str()), now),
            ]);
        }
        let mut table = builder.build();
        style::apply_table_style(&mut table, opts.style);
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output
}

pub fn format_devices_json(
    devices: &[DeviceSummary],
    thresholds: &Thresholds,
    opts: &FormatOptions,
) -> Result<String> {
    let rows: Vec<DeviceRow<'_>> = devices.iter().map(|d| device_row(d, thresholds)).collect();
    opts.as_json(&rows)
}

#[must_use]
pub fn format_devices_csv(
    devices: &[DeviceSummary],
    thresholds: &Thresholds,
    opts: &FormatOptions,
) -> String {
    let mut output = opts.header(
        "id,device_uid,co2_ppm,severity,latitude,longitude,recorded_at,registered_at",
    );
    for device in devices {
        let row = device_row(device, thresholds);
        output.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            row.id,
            csv_escape(row.device_uid),
            csv_opt(row.co2),
            row.severity,
            csv_opt(row.latitude),
            csv_opt(row.longitude),
            csv_escape(row.recorded_at.unwrap_or_default()),
            csv_escape(row.registered_at),
        ));
    }
    output
}

// ============================================================================
// Fleet statistics
// ============================================================================

#[derive(Serialize)]
struct StatsOutput<'a> {
    #[serde(flatten)]
    stats: &'a FleetStats,
    thresholds: &'a Thresholds,
}

#[must_use]
pub fn format_stats_text(stats: &FleetStats, thresholds: &Thresholds, opts: &FormatOptions) -> String {
    let ppm = |value: Option<f64>| -> String {
        match value {
            Some(_) => format!(
                "{} ppm",
                style::format_ppm_colored(value, thresholds.classify(value), opts.no_color)
            ),
            None => "-".to_string(),
        }
    };

    let mut output = if opts.is_rich() {
        format!("{}\n", style::format_title("Fleet overview", opts.no_color))
    } else {
        "Fleet overview:\n".to_string()
    };
    output.push_str(&format!(
        "  Devices:        {} ({} with data, {} without)\n",
        stats.total,
        stats.with_data,
        stats.without_data()
    ));
    output.push_str(&format!("  With location:  {}\n", stats.with_location));
    output.push_str(&format!("  Average CO2:    {}\n", ppm(stats.average)));
    output.push_str(&format!("  Highest:        {}\n", ppm(stats.max)));
    output.push_str(&format!("  Lowest:         {}\n", ppm(stats.min)));

    let exceeding = format!("{}", stats.exceeding);
    let exceeding = if stats.exceeding > 0 && !opts.no_color {
        format!("{}", exceeding.red().bold())
    } else {
        exceeding
    };
    output.push_str(&format!(
        "  Exceeding {} ppm: {}\n",
        format_ppm(Some(thresholds.high)),
        exceeding
    ));
    output
}

pub fn format_stats_json(
    stats: &FleetStats,
    thresholds: &Thresholds,
    opts: &FormatOptions,
) -> Result<String> {
    opts.as_json(&StatsOutput { stats, thresholds })
}

#[must_use]
pub fn format_stats_csv(stats: &FleetStats, opts: &FormatOptions) -> String {
    let mut output =
        opts.header("total,with_data,with_location,min_ppm,max_ppm,average_ppm,exceeding");
    output.push_str(&stats_csv_fields(stats));
    output.push('\n');
    output
}

fn stats_csv_fields(stats: &FleetStats) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        stats.total,
        stats.with_data,
        stats.with_location,
        csv_opt(stats.min),
        csv_opt(stats.max),
        csv_opt(stats.average.map(f64::round)),
        stats.exceeding
    )
}

// ============================================================================
// Live polling
// ============================================================================

/// One poll cycle of `safeair live`.
pub struct LiveSnapshot<'a> {
    pub timestamp: &'a str,
    pub stats: Option<&'a FleetStats>,
    pub previous_average: Option<f64>,
    pub error: Option<&'a str>,
}

#[derive(Serialize)]
struct LiveJson<'a> {
    timestamp: &'a str,
    stats: Option<&'a FleetStats>,
    error: Option<&'a str>,
}

#[must_use]
pub fn format_live_line(
    snapshot: &LiveSnapshot<'_>,
    thresholds: &Thresholds,
    opts: &FormatOptions,
) -> String {
    let mut line = format!("[{}]", snapshot.timestamp);

    if let Some(stats) = snapshot.stats {
        let trend = match (stats.average, snapshot.previous_average) {
            (Some(current), Some(previous)) => {
                style::trend_indicator(current, previous, opts.no_color)
            }
            // First reading: no change data yet.
            _ => "~",
        };
        let average = style::format_ppm_colored(
            stats.average,
            thresholds.classify(stats.average),
            opts.no_color,
        );
        let max = style::format_ppm_colored(stats.max, thresholds.classify(stats.max), opts.no_color);
        line.push_str(&format!(
            " {}/{} reporting | avg {} ppm {} | max {} ppm | {} high",
            stats.with_data, stats.total, average, trend, max, stats.exceeding
        ));
    }

    if let Some(error) = snapshot.error {
        let error = if snapshot.stats.is_some() {
            format!("{} (showing last data)", error)
        } else {
            error.to_string()
        };
        line.push(' ');
        line.push_str(&style::format_warning(&error, opts.no_color));
    }

    line.push('\n');
    line
}

pub fn format_live_json(snapshot: &LiveSnapshot<'_>) -> Result<String> {
    // One object per line so the stream stays parseable.
    let json = serde_json::to_string(&LiveJson {
        timestamp: snapshot.timestamp,
        stats: snapshot.stats,
        error: snapshot.error,
    })?;
    Ok(json + "\n")
}

#[must_use]
pub fn format_live_csv_header() -> String {
    "timestamp,total,with_data,with_location,min_ppm,max_ppm,average_ppm,exceeding,error\n"
        .to_string()
}

#[must_use]
pub fn format_live_csv_line(snapshot: &LiveSnapshot<'_>) -> String {
    let stats = snapshot
        .stats
        .map(stats_csv_fields)
        .unwrap_or_else(|| ",,,,,,".to_string());
    format!(
        "{},{},{}\n",
        csv_escape(snapshot.timestamp),
        stats,
        csv_escape(snapshot.error.unwrap_or_default())
    )
}

// ============================================================================
// Trends
// ============================================================================

/// Width of the hourly bars in text output.
const TREND_BAR_WIDTH: usize = 40;

#[must_use]
pub fn format_trends_text(
    response: &TrendResponse,
    devices: &[&DeviceTrend],
    thresholds: &Thresholds,
    opts: &FormatOptions,
) -> String {
    let title = if response.current_day_selected.is_empty() {
        "Hourly CO2 trends".to_string()
    } else {
        format!("Hourly CO2 trends: {}", response.current_day_selected)
    };
    let mut output = if opts.is_rich() {
        format!("{}\n", style::format_title(&title, opts.no_color))
    } else {
        format!("{}\n", title)
    };

    if devices.is_empty() {
        output.push_str("No locations match.\n");
        return output;
    }

    let bar_width = TREND_BAR_WIDTH.min(style::terminal_width().saturating_sub(24).max(10));

    for device in devices {
        let severity = peak_severity(device, thresholds);
        let name = if opts.no_color {
            device.name.clone()
        } else {
            format!("{}", device.name.bold())
        };
        output.push_str(&format!(
            "\n{} ({}) {} {}\n",
            name,
            device.device_uid,
            device.detail(),
            style::format_severity_badge(severity, opts.no_color)
        ));

        if device.hourly_ppm_data.is_empty() {
            output.push_str("  No hourly data.\n");
            continue;
        }

        if let Some(peak) = peak_point(&device.hourly_ppm_data) {
            output.push_str(&format!(
                "  Peak: {} ppm at {}\n",
                format_ppm(Some(peak.ppm_value)),
                peak.time
            ));
        }

        let max = max_ppm(&device.hourly_ppm_data);
        for point in &device.hourly_ppm_data {
            let point_severity = thresholds.classify(Some(point.ppm_value));
            let marker = if point.is_peak { " *" } else { "" };
            output.push_str(&format!(
                "  {:>5} {} {:>5}{}\n",
                point.time,
                style::trend_bar(point.ppm_value, max, bar_width, point_severity, opts.no_color),
                format_ppm(Some(point.ppm_value)),
                marker
            ));
        }
    }

    output
}

pub fn format_trends_json(
    response: &TrendResponse,
    devices: &[&DeviceTrend],
    opts: &FormatOptions,
) -> Result<String> {
    let filtered = TrendResponse {
        current_day_selected: response.current_day_selected.clone(),
        available_days: response.available_days.clone(),
        device_locations_data: devices.iter().map(|d| (*d).clone()).collect(),
    };
    opts.as_json(&filtered)
}

#[must_use]
pub fn format_trends_csv(devices: &[&DeviceTrend], opts: &FormatOptions) -> String {
    let mut output = opts.header("device_uid,name,hour,time,ppm,is_peak");
    for device in devices {
        for point in &device.hourly_ppm_data {
            output.push_str(&format!(
                "{},{},{},{},{},{}\n",
                csv_escape(&device.device_uid),
                csv_escape(&device.name),
                point.hour,
                csv_escape(&point.time),
                point.ppm_value,
                point.is_peak
            ));
        }
    }
    output
}

/// Apply the search filter of `safeair trends`.
#[must_use]
pub fn select_trends<'a>(response: &'a TrendResponse, search: Option<&str>) -> Vec<&'a DeviceTrend> {
    filter_devices(&response.device_locations_data, search.unwrap_or_default())
}

// ============================================================================
// Map
// ============================================================================

/// Result of `safeair map`.
pub struct MapOutput<'a> {
    pub view: MapView,
    pub markers: &'a [MapMarker],
    pub static_map_url: Option<String>,
    pub map_error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerJson<'a> {
    device_uid: &'a str,
    latitude: f64,
    longitude: f64,
    co2: Option<f64>,
    severity: &'static str,
    color: &'static str,
    recorded_at: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapJson<'a> {
    center: safeair_types::GeoLocation,
    zoom: u8,
    markers: Vec<MarkerJson<'a>>,
    static_map_url: Option<&'a str>,
    map_error: Option<&'a str>,
}

#[must_use]
pub fn format_map_text(map: &MapOutput<'_>, now: OffsetDateTime, opts: &FormatOptions) -> String {
    let mut output = if opts.is_rich() {
        format!("{}\n", style::format_title("Device map", opts.no_color))
    } else {
        "Device map:\n".to_string()
    };
    output.push_str(&format!(
        "Centre: {} (zoom {})\n",
        map.view.center, map.view.zoom
    ));

    if map.markers.is_empty() {
        output.push_str("No devices have a location yet.\n");
    } else {
        let mut builder = Builder::default();
        builder.push_record(["Device", "CO2 (ppm)", "Status", "Location", "Updated"]);
        for marker in map.markers {
            builder.push_record([
                marker.device_uid.clone(),
                style::format_ppm_colored(marker.ppm, marker.severity, opts.no_color),
                style::format_severity_badge(marker.severity, opts.no_color),
                marker.location.to_string(),
                relative_time(marker.recorded_at.as_deref(), now),
            ]);
        }
        let mut table = builder.build();
        style::apply_table_style(&mut table, opts.style);
        output.push_str(&table.to_string());
        output.push('\n');
    }

    if let Some(url) = &map.static_map_url {
        output.push_str(&format!("\nStatic map: {}\n", url));
    }
    if let Some(error) = &map.map_error {
        output.push_str(&format!("\n{}\n", style::format_warning(error, opts.no_color)));
    }
    output
}

pub fn format_map_json(map: &MapOutput<'_>, opts: &FormatOptions) -> Result<String> {
    let markers = map
        .markers
        .iter()
        .map(|m| MarkerJson {
            device_uid: &m.device_uid,
            latitude: m.location.latitude,
            longitude: m.location.longitude,
            co2: m.ppm,
            severity: m.severity.slug(),
            color: m.severity.hex_color(),
            recorded_at: m.recorded_at.as_deref(),
        })
        .collect();
    opts.as_json(&MapJson {
        center: map.view.center,
        zoom: map.view.zoom,
        markers,
        static_map_url: map.static_map_url.as_deref(),
        map_error: map.map_error.as_deref(),
    })
}

#[must_use]
pub fn format_map_csv(markers: &[MapMarker], opts: &FormatOptions) -> String {
    let mut output = opts.header("device_uid,latitude,longitude,co2_ppm,severity,color");
    for marker in markers {
        output.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_escape(&marker.device_uid),
            marker.location.latitude,
            marker.location.longitude,
            csv_opt(marker.ppm),
            marker.severity.slug(),
            marker.severity.hex_color()
        ));
    }
    output
}

// ============================================================================
// Registration
// ============================================================================

#[must_use]
pub fn format_registered_text(
    requested_uid: &str,
    created: &RegisteredDevice,
    opts: &FormatOptions,
) -> String {
    let uid = created.device_uid.as_deref().unwrap_or(requested_uid);
    let mut message = format!("Registered device {}", uid);
    if let Some(id) = created.id {
        message.push_str(&format!(" (id {})", id));
    }
    if let Some(at) = &created.registered_at {
        message.push_str(&format!(" at {}", at));
    }
    format!("{}\n", style::format_success(&message, opts.no_color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeair_core::map::markers;
    use safeair_core::mock::{sample_devices, sample_trends};
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-01-12 09:31:00 UTC);

    fn test_opts() -> FormatOptions {
        FormatOptions::new(true, StyleMode::Plain)
    }

    #[test]
    fn test_plain_style_disables_color() {
        let opts = FormatOptions::new(false, StyleMode::Plain);
        assert!(opts.no_color);
        let opts = FormatOptions::new(false, StyleMode::Rich);
        assert!(!opts.no_color);
        assert!(opts.is_rich());
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_format_devices_text_splits_devices_without_data() {
        let devices = sample_devices();
        let text = format_devices_text(&devices, &Thresholds::default(), NOW, &test_opts());

        assert!(text.contains("Live devices (3)"));
        assert!(text.contains("Devices without data (1)"));
        assert!(text.contains("SAT-0002"));
        assert!(text.contains("1132"));
        assert!(text.contains("[HIGH]"));
    }

    #[test]
    fn test_format_devices_text_empty() {
        let text = format_devices_text(&[], &Thresholds::default(), NOW, &test_opts());
        assert_eq!(text, "No devices registered.\n");
    }

    #[test]
    fn test_format_devices_json_structure() {
        let devices = sample_devices();
        let json = format_devices_json(&devices, &Thresholds::default(), &test_opts()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["deviceUid"], "SAT-0001");
        assert_eq!(rows[0]["severity"], "normal");
        assert_eq!(rows[1]["severity"], "high");
        assert!(rows[3]["co2"].is_null());
        assert_eq!(rows[3]["severity"], "no-data");
    }

    #[test]
    fn test_format_devices_csv_header_toggle() {
        let devices = sample_devices();
        let csv = format_devices_csv(&devices, &Thresholds::default(), &test_opts());
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,device_uid,co2_ppm,severity,latitude,longitude,recorded_at,registered_at")
        );
        assert_eq!(lines.count(), 4);

        let csv = format_devices_csv(
            &devices,
            &Thresholds::default(),
            &test_opts().with_no_header(true),
        );
        assert!(csv.starts_with("1,SAT-0001,742,normal,"));
    }

    #[test]
    fn test_format_stats_text() {
        let devices = sample_devices();
        let thresholds = Thresholds::default();
        let stats = FleetStats::compute(&devices, &thresholds);
        let text = format_stats_text(&stats, &thresholds, &test_opts());

        assert!(text.contains("Devices:        4 (3 with data, 1 without)"));
        assert!(text.contains("Highest:        1132 ppm"));
        assert!(text.contains("Exceeding 1000 ppm: 1"));
    }

    #[test]
    fn test_format_stats_json_includes_thresholds() {
        let stats = FleetStats::compute(&sample_devices(), &Thresholds::default());
        let json =
            format_stats_json(&stats, &Thresholds::default(), &test_opts().with_compact(true))
                .unwrap();
        assert_eq!(json.lines().count(), 1);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["total"], 4);
        assert_eq!(parsed["withData"], 3);
        assert_eq!(parsed["thresholds"]["high"], 1000.0);
    }

    #[test]
    fn test_format_stats_csv_without_data() {
        let stats = FleetStats::compute(&[], &Thresholds::default());
        let csv = format_stats_csv(&stats, &test_opts().with_no_header(true));
        assert_eq!(csv, "0,0,0,,,,0\n");
    }

    #[test]
    fn test_format_live_line_with_stale_data() {
        let stats = FleetStats::compute(&sample_devices(), &Thresholds::default());
        let snapshot = LiveSnapshot {
            timestamp: "09:31:00",
            stats: Some(&stats),
            previous_average: None,
            error: Some("Unable to load live device data: HTTP 500"),
        };
        let line = format_live_line(&snapshot, &Thresholds::default(), &test_opts());
        assert!(line.starts_with("[09:31:00] 3/4 reporting"));
        assert!(line.contains("max 1132 ppm"));
        assert!(line.contains(" ~ "));
        assert!(line.contains("[!!] Unable to load live device data: HTTP 500 (showing last data)"));
    }

    #[test]
    fn test_format_live_line_error_only() {
        let snapshot = LiveSnapshot {
            timestamp: "09:31:00",
            stats: None,
            previous_average: None,
            error: Some("LIVE_URL not configured"),
        };
        let line = format_live_line(&snapshot, &Thresholds::default(), &test_opts());
        assert_eq!(line, "[09:31:00] [!!] LIVE_URL not configured\n");
    }

    #[test]
    fn test_format_live_csv_line() {
        let snapshot = LiveSnapshot {
            timestamp: "09:31:00",
            stats: None,
            previous_average: None,
            error: Some("boom, again"),
        };
        assert_eq!(
            format_live_csv_line(&snapshot),
            "09:31:00,,,,,,,,\"boom, again\"\n"
        );
        assert_eq!(
            format_live_csv_header().trim_end().split(',').count(),
            format_live_csv_line(&snapshot).trim_end().split(',').count() - 1
        );
    }

    #[test]
    fn test_format_live_json_is_single_line() {
        let snapshot = LiveSnapshot {
            timestamp: "09:31:00",
            stats: None,
            previous_average: None,
            error: None,
        };
        let json = format_live_json(&snapshot).unwrap();
        assert_eq!(json, "{\"timestamp\":\"09:31:00\",\"stats\":null,\"error\":null}\n");
    }

    #[test]
    fn test_format_trends_text() {
        let response = sample_trends();
        let devices = select_trends(&response, None);
        let text = format_trends_text(&response, &devices, &Thresholds::default(), &test_opts());

        assert!(text.contains("Industrial Plant (SAT-0002)"));
        assert!(text.contains("Peak:"));
        assert!(text.contains(" *"));
    }

    #[test]
    fn test_select_trends_search() {
        let response = sample_trends();
        let devices = select_trends(&response, Some("industrial"));
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_uid, "SAT-0002");

        let none = select_trends(&response, Some("nowhere"));
        let text = format_trends_text(&response, &none, &Thresholds::default(), &test_opts());
        assert!(text.contains("No locations match."));
    }

    #[test]
    fn test_format_trends_csv_rows() {
        let response = sample_trends();
        let devices = select_trends(&response, None);
        let points: usize = devices.iter().map(|d| d.hourly_ppm_data.len()).sum();
        let csv = format_trends_csv(&devices, &test_opts());
        assert_eq!(csv.lines().count(), points + 1);
        assert!(csv.starts_with("device_uid,name,hour,time,ppm,is_peak\n"));
    }

    #[test]
    fn test_format_map_outputs() {
        let devices = sample_devices();
        let markers = markers(&devices, &Thresholds::default());
        let map = MapOutput {
            view: MapView::fit(&markers),
            markers: &markers,
            static_map_url: None,
            map_error: Some("Please set SAFEAIR_MAPS_API_KEY".to_string()),
        };

        let text = format_map_text(&map, NOW, &test_opts());
        assert!(text.contains("Centre:"));
        assert!(text.contains("[!!] Please set SAFEAIR_MAPS_API_KEY"));

        let json = format_map_json(&map, &test_opts()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["markers"].as_array().unwrap().len(), markers.len());
        assert!(parsed["staticMapUrl"].is_null());

        let csv = format_map_csv(&markers, &test_opts());
        assert_eq!(csv.lines().count(), markers.len() + 1);
    }

    #[test]
    fn test_format_registered_text() {
        let created = RegisteredDevice {
            id: Some(42),
            device_uid: Some("SAT-0100".to_string()),
            registered_at: None,
        };
        assert_eq!(
            format_registered_text("SAT-0100", &created, &test_opts()),
            "[OK] Registered device SAT-0100 (id 42)\n"
        );
        assert_eq!(
            format_registered_text("SAT-0100", &RegisteredDevice::default(), &test_opts()),
            "[OK] Registered device SAT-0100\n"
        );
    }
}
