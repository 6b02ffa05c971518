//! Severity colors for the TUI.
//!
//! The palette matches the one used for map markers and CLI badges, so a
//! reading has the same color everywhere.

use ratatui::style::Color;
use safeair_core::Thresholds;
use safeair_types::Severity;

/// Terminal color of a severity band.
#[must_use]
pub fn severity_color(severity: Severity) -> Color {
    let (r, g, b) = severity.rgb();
    Color::Rgb(r, g, b)
}

/// Color of a ppm reading under `thresholds`.
#[must_use]
pub fn ppm_color(ppm: Option<f64>, thresholds: &Thresholds) -> Color {
    severity_color(thresholds.classify(ppm))
}

/// Short uppercase badge text, e.g. `HIGH`.
#[must_use]
pub fn severity_badge(severity: Severity) -> String {
    severity.label().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppm_color_follows_thresholds() {
        let thresholds = Thresholds::default();
        assert_eq!(
            ppm_color(Some(1132.0), &thresholds),
            severity_color(Severity::High)
        );
        assert_eq!(ppm_color(None, &thresholds), severity_color(Severity::NoData));
        assert_ne!(
            ppm_color(Some(742.0), &thresholds),
            ppm_color(Some(850.0), &thresholds)
        );
    }

    #[test]
    fn test_no_data_is_slate() {
        assert_eq!(severity_color(Severity::NoData), Color::Rgb(100, 116, 139));
    }

    #[test]
    fn test_badge() {
        assert_eq!(severity_badge(Severity::Elevated), "ELEVATED");
    }
}
