//! Configurable CO₂ severity thresholds.
//!
//! # Example
//!
//! ```
//! use safeair_core::Thresholds;
//! use safeair_types::Severity;
//!
//! let thresholds = Thresholds::default();
//! assert_eq!(thresholds.classify(Some(850.0)), Severity::Elevated);
//!
//! let strict = Thresholds::new(600.0, 800.0).unwrap();
//! assert_eq!(strict.classify(Some(850.0)), Severity::High);
//! ```

use serde::{Deserialize, Serialize};

use safeair_types::{ELEVATED_PPM, HIGH_PPM, Severity};

use crate::error::{Error, Result};

/// The two cut-offs separating normal, elevated and high readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Lower bound (inclusive) of the elevated band.
    pub elevated: f64,
    /// Lower bound (inclusive) of the high band.
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            elevated: ELEVATED_PPM,
            high: HIGH_PPM,
        }
    }
}

impl Thresholds {
    /// Create thresholds, checking `0 < elevated < high`.
    pub fn new(elevated: f64, high: f64) -> Result<Self> {
        let thresholds = Self { elevated, high };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Validate the thresholds.
    pub fn validate(&self) -> Result<()> {
        if !(self.elevated.is_finite() && self.high.is_finite()) {
            return Err(Error::invalid_config("thresholds must be finite"));
        }
        if self.elevated <= 0.0 {
            return Err(Error::invalid_config(
                "elevated threshold must be greater than 0",
            ));
        }
        if self.elevated >= self.high {
            return Err(Error::invalid_config(format!(
                "elevated threshold ({}) must be below high threshold ({})",
                self.elevated, self.high
            )));
        }
        Ok(())
    }

    /// Classify a reading.
    #[must_use]
    pub fn classify(&self, ppm: Option<f64>) -> Severity {
        Severity::classify_with(ppm, self.elevated, self.high)
    }

    /// Whether a reading is at or above the high threshold.
    #[must_use]
    pub fn exceeds_high(&self, ppm: Option<f64>) -> bool {
        self.classify(ppm) == Severity::High
    }

    /// Whether these are the stock 800/1000 ppm thresholds.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
