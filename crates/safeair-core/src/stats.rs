//! Fleet-wide statistics for the stat cards.

use serde::Serialize;

use safeair_types::DeviceSummary;

use crate::thresholds::Thresholds;

/// Aggregates over the current device set.
///
/// `min`, `max` and `average` only consider devices that reported a reading,
/// and are absent when none did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    /// Number of registered devices.
    pub total: usize,
    /// Devices with a latest reading.
    pub with_data: usize,
    /// Devices with a known location.
    pub with_location: usize,
    /// Lowest latest reading.
    pub min: Option<f64>,
    /// Highest latest reading.
    pub max: Option<f64>,
    /// Mean of the latest readings.
    pub average: Option<f64>,
    /// Devices at or above the high threshold.
    pub exceeding: usize,
}

impl FleetStats {
    /// Compute statistics for `devices`.
    #[must_use]
    pub fn compute(devices: &[DeviceSummary], thresholds: &Thresholds) -> Self {
        let readings: Vec<f64> = devices
            .iter()
            .filter_map(|d| d.latest_co2)
            .filter(|ppm| !ppm.is_nan())
            .collect();

        let (min, max, average) = if readings.is_empty() {
            (None, None, None)
        } else {
            let min = readings.iter().copied().fold(f64::INFINITY, f64::min);
            let max = readings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let average = readings.iter().sum::<f64>() / readings.len() as f64;
            (Some(min), Some(max), Some(average))
        };

        Self {
            total: devices.len(),
            with_data: readings.len(),
            with_location: devices.iter().filter(|d| d.location.is_some()).count(),
            min,
            max,
            average,
            exceeding: devices
                .iter()
                .filter(|d| thresholds.exceeds_high(d.latest_co2))
                .count(),
        }
    }

    /// Devices without a reading.
    #[must_use]
    pub fn without_data(&self) -> usize {
        self.total - self.with_data
    }
}
