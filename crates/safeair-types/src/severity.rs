//! CO₂ severity bands.
//!
//! Every view classifies readings through [`Severity::classify`] so the
//! thresholds are applied the same way everywhere.
//!
//! | Range (ppm)      | Band     | Colour    |
//! |------------------|----------|-----------|
//! | absent           | No data  | `#64748b` |
//! | < 800            | Normal   | `#10b981` |
//! | 800 ≤ ppm < 1000 | Elevated | `#f59e0b` |
//! | ≥ 1000           | High     | `#ef4444` |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the elevated band, in ppm.
pub const ELEVATED_PPM: f64 = 800.0;

/// Lower bound (inclusive) of the high band, in ppm.
pub const HIGH_PPM: f64 = 1000.0;

/// Severity band of a CO₂ reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// No reading is available.
    NoData,
    /// Below the elevated threshold.
    Normal,
    /// At or above the elevated threshold, below the high threshold.
    Elevated,
    /// At or above the high threshold.
    High,
}

impl Severity {
    /// All bands, in ascending order.
    pub const ALL: [Severity; 4] = [
        Severity::NoData,
        Severity::Normal,
        Severity::Elevated,
        Severity::High,
    ];

    /// Classify a reading against the default 800/1000 ppm thresholds.
    ///
    /// `NaN` is treated like an absent reading.
    #[must_use]
    pub fn classify(ppm: Option<f64>) -> Self {
        Self::classify_with(ppm, ELEVATED_PPM, HIGH_PPM)
    }

    /// Classify a reading against explicit thresholds.
    #[must_use]
    pub fn classify_with(ppm: Option<f64>, elevated: f64, high: f64) -> Self {
        match ppm {
            None => Severity::NoData,
            Some(p) if p.is_nan() => Severity::NoData,
            Some(p) if p < elevated => Severity::Normal,
            Some(p) if p < high => Severity::Elevated,
            Some(_) => Severity::High,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Severity::NoData => "No data",
            Severity::Normal => "Normal",
            Severity::Elevated => "Elevated",
            Severity::High => "High",
        }
    }

    /// Stable machine-readable identifier (`no-data`, `normal`, ...).
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Severity::NoData => "no-data",
            Severity::Normal => "normal",
            Severity::Elevated => "elevated",
            Severity::High => "high",
        }
    }

    /// Display colour as a hex RGB token.
    #[must_use]
    pub fn hex_color(self) -> &'static str {
        match self {
            Severity::NoData => "#64748b",
            Severity::Normal => "#10b981",
            Severity::Elevated => "#f59e0b",
            Severity::High => "#ef4444",
        }
    }

    /// Display colour as an RGB triple.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Severity::NoData => (100, 116, 139),
            Severity::Normal => (16, 185, 129),
            Severity::Elevated => (245, 158, 11),
            Severity::High => (239, 68, 68),
        }
    }

    /// Whether the band calls for attention (elevated or high).
    #[must_use]
    pub fn is_alert(self) -> bool {
        matches!(self, Severity::Elevated | Severity::High)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
