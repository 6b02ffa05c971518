//! Shared types for the SafeAir CO₂ dashboard.
//!
//! This crate holds the JSON wire types of the SafeAir backend REST API and
//! the single CO₂ severity classifier used by every view.
//!
//! # Example
//!
//! ```
//! use safeair_types::{DeviceSummary, Severity};
//!
//! let json = r#"{"id": 1, "deviceUid": "SAT-1", "registeredAt": "2025-01-01T00:00:00",
//!               "location": null, "latestCo2": 1132.0, "latestRecordedAt": null}"#;
//! let device: DeviceSummary = serde_json::from_str(json).unwrap();
//! assert_eq!(device.severity(), Severity::High);
//! ```

pub mod error;
pub mod severity;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use severity::{ELEVATED_PPM, HIGH_PPM, Severity};
pub use types::{
    DeviceSummary, DeviceTrend, GeoLocation, HourlyPpmPoint, OwnerType, RegisterDeviceRequest,
    RegisteredDevice, TrendResponse, parse_timestamp,
};
