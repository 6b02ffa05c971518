//! Visual styling utilities for the CLI.
//!
//! This module provides consistent styling across all CLI output including:
//! - Spinners for network requests
//! - Severity colors and badges
//! - Table formatting

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use safeair_core::BarScale;
use safeair_core::display::format_ppm;
use safeair_types::Severity;

use crate::cli::StyleMode;

// ============================================================================
// Progress Indicators
// ============================================================================

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

/// Get the standard spinner style.
fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .expect("valid template")
        .tick_chars(SPINNER_TICK_CHARS)
}

/// Create a spinner for a backend request.
pub fn fetching_spinner(what: &str) -> ProgressBar {
    operation_spinner(&format!("Fetching {}...", what))
}

/// Create a spinner for generic operations.
pub fn operation_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

// ============================================================================
// Severity Colors
// ============================================================================

/// Paint `text` in the severity's color.
pub fn paint(text: &str, severity: Severity, no_color: bool) -> String {
    if no_color {
        return text.to_string();
    }
    match severity {
        Severity::Normal => format!("{}", text.green()),
        Severity::Elevated => format!("{}", text.yellow()),
        Severity::High => format!("{}", text.red()),
        Severity::NoData => format!("{}", text.dimmed()),
    }
}

/// Format a ppm value with its severity color.
pub fn format_ppm_colored(ppm: Option<f64>, severity: Severity, no_color: bool) -> String {
    paint(&format_ppm(ppm), severity, no_color)
}

/// Format a severity as a bracketed badge, e.g. `[HIGH]`.
pub fn format_severity_badge(severity: Severity, no_color: bool) -> String {
    let label = severity.label().to_uppercase();
    if no_color {
        return format!("[{}]", label);
    }
    let (r, g, b) = severity.rgb();
    format!("[{}]", label.truecolor(r, g, b).bold())
}

/// Horizontal bar for a trend value, `width` cells at 100%.
pub fn trend_bar(value: f64, max: f64, width: usize, severity: Severity, no_color: bool) -> String {
    let percent = BarScale::TREND_PANEL.height(value, max);
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled));
    paint(&bar, severity, no_color)
}

// ============================================================================
// Messages and Headers
// ============================================================================

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let underline = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, underline)
    } else {
        format!("{}\n{}", title.bold(), underline.dimmed())
    }
}

/// Get trend indicator comparing current and previous values.
pub fn trend_indicator(current: f64, previous: f64, no_color: bool) -> &'static str {
    let diff = current - previous;
    if diff.abs() < 5.0 {
        "-"
    } else if diff > 0.0 {
        if no_color { "^" } else { "↑" }
    } else if no_color {
        "v"
    } else {
        "↓"
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Get terminal width, defaulting to 80 if detection fails.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Apply table style based on StyleMode.
pub fn apply_table_style(table: &mut tabled::Table, style: StyleMode) {
    use tabled::settings::Style;
    match style {
        StyleMode::Rich | StyleMode::Minimal => {
            table.with(Style::rounded());
        }
        StyleMode::Plain => {
            table.with(Style::blank());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_output_is_plain() {
        assert_eq!(format_ppm_colored(Some(1132.0), Severity::High, true), "1132");
        assert_eq!(format_ppm_colored(None, Severity::NoData, true), "-");
        assert_eq!(format_severity_badge(Severity::Elevated, true), "[ELEVATED]");
        assert_eq!(format_success("done", true), "[OK] done");
        assert_eq!(format_warning("careful", true), "[!!] careful");
    }

    #[test]
    fn test_colored_output_contains_text() {
        let colored = format_ppm_colored(Some(742.0), Severity::Normal, false);
        assert!(colored.contains("742"));
        assert_ne!(colored, "742");
    }

    #[test]
    fn test_trend_bar_width() {
        // 80% of max maps to 10 + 0.8 * 80 = 74% of the width.
        let bar = trend_bar(800.0, 1000.0, 50, Severity::Elevated, true);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 37);
        assert_eq!(bar.chars().count(), 50);

        let full = trend_bar(1000.0, 1000.0, 20, Severity::High, true);
        assert_eq!(full.chars().filter(|c| *c == '█').count(), 18);

        let empty = trend_bar(0.0, 0.0, 20, Severity::NoData, true);
        assert_eq!(empty.chars().filter(|c| *c == '█').count(), 2);
    }

    #[test]
    fn test_trend_indicator() {
        assert_eq!(trend_indicator(900.0, 800.0, true), "^");
        assert_eq!(trend_indicator(700.0, 800.0, true), "v");
        assert_eq!(trend_indicator(802.0, 800.0, true), "-");
        assert_eq!(trend_indicator(900.0, 800.0, false), "↑");
    }

    #[test]
    fn test_format_title() {
        assert_eq!(format_title("Fleet", true), "Fleet\n━━━━━");
    }
}
