//! Wire types for the SafeAir backend REST API.
//!
//! The backend serializes camelCase JSON. Timestamps are kept as the strings the
//! backend sent and parsed on demand, since the backend mixes RFC 3339 values
//! with offset-less local date-times.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::{ValidationError, ValidationResult};
use crate::severity::Severity;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// Create a new location.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates are within their valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Latest state of one registered device, as returned by
/// `GET /api/devices/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    /// Backend identifier.
    pub id: i64,
    /// Device UID printed on the sensor.
    pub device_uid: String,
    /// Registration timestamp as sent by the backend.
    pub registered_at: String,
    /// Last known location, if the device ever reported one.
    #[serde(default)]
    pub location: Option<GeoLocation>,
    /// Latest CO₂ reading in ppm.
    #[serde(default)]
    pub latest_co2: Option<f64>,
    /// When the latest reading was recorded.
    #[serde(default)]
    pub latest_recorded_at: Option<String>,
}

impl DeviceSummary {
    /// Severity band of the latest reading.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::classify(self.latest_co2)
    }

    /// Whether the device has reported at least one reading.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.latest_co2.is_some()
    }

    /// Parsed time of the latest reading.
    #[must_use]
    pub fn recorded_at(&self) -> Option<OffsetDateTime> {
        self.latest_recorded_at.as_deref().and_then(parse_timestamp)
    }

    /// Parsed registration time.
    #[must_use]
    pub fn registered_at_time(&self) -> Option<OffsetDateTime> {
        parse_timestamp(&self.registered_at)
    }
}

/// One hourly sample of a device trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPpmPoint {
    /// Hour label (e.g. "14:00").
    pub time: String,
    /// Concentration in ppm.
    pub ppm_value: f64,
    /// Whether the backend flagged this hour as the peak.
    #[serde(default)]
    pub is_peak: bool,
    /// Hour of day, 0-23.
    pub hour: u8,
}

/// A device with its hourly trend for the selected day or date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTrend {
    pub id: String,
    pub name: String,
    pub device_uid: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub alert_level: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub hourly_ppm_data: Vec<HourlyPpmPoint>,
}

impl DeviceTrend {
    /// Location, when both coordinates are present.
    #[must_use]
    pub fn location(&self) -> Option<GeoLocation> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoLocation::new(lat, lng)),
            _ => None,
        }
    }

    /// Detail line: the alert level unless it is empty or "Normal", else the status.
    #[must_use]
    pub fn detail(&self) -> &str {
        if !self.alert_level.is_empty() && self.alert_level != "Normal" {
            &self.alert_level
        } else {
            &self.status
        }
    }
}

/// Response of `GET /api/dashboard/device-locations`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResponse {
    #[serde(default)]
    pub current_day_selected: String,
    #[serde(default)]
    pub available_days: Vec<String>,
    #[serde(default)]
    pub device_locations_data: Vec<DeviceTrend>,
}

impl TrendResponse {
    /// Find a device by UID.
    #[must_use]
    pub fn device(&self, device_uid: &str) -> Option<&DeviceTrend> {
        self.device_locations_data
            .iter()
            .find(|d| d.device_uid == device_uid)
    }
}

/// Kind of organisation or person owning a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerType {
    #[default]
    Company,
    Individual,
    Government,
    NonProfit,
}

impl OwnerType {
    /// All owner types in display order.
    pub const ALL: [OwnerType; 4] = [
        OwnerType::Company,
        OwnerType::Individual,
        OwnerType::Government,
        OwnerType::NonProfit,
    ];

    /// Wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OwnerType::Company => "COMPANY",
            OwnerType::Individual => "INDIVIDUAL",
            OwnerType::Government => "GOVERNMENT",
            OwnerType::NonProfit => "NON_PROFIT",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            OwnerType::Company => "Company",
            OwnerType::Individual => "Individual",
            OwnerType::Government => "Government",
            OwnerType::NonProfit => "Non-Profit",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for OwnerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "COMPANY" => Ok(OwnerType::Company),
            "INDIVIDUAL" => Ok(OwnerType::Individual),
            "GOVERNMENT" => Ok(OwnerType::Government),
            "NON_PROFIT" | "NONPROFIT" => Ok(OwnerType::NonProfit),
            _ => Err(ValidationError::UnknownOwnerType(s.to_string())),
        }
    }
}

/// Body of `POST /api/devices`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    pub device_uid: String,
    pub owner_type: OwnerType,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub initial_latitude: f64,
    pub initial_longitude: f64,
    pub phone_model: String,
}

impl RegisterDeviceRequest {
    /// Check the request before sending it.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.device_uid.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "deviceUid",
            });
        }
        if self.owner_name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "ownerName",
            });
        }
        let email = self.owner_email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid_email {
            return Err(ValidationError::InvalidEmail(self.owner_email.clone()));
        }
        if self.owner_phone.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "ownerPhone",
            });
        }
        if !(-90.0..=90.0).contains(&self.initial_latitude) {
            return Err(ValidationError::CoordinateOutOfRange {
                field: "initialLatitude",
                value: self.initial_latitude,
                min: -90.0,
                max: 90.0,
            });
        }
        if !(-180.0..=180.0).contains(&self.initial_longitude) {
            return Err(ValidationError::CoordinateOutOfRange {
                field: "initialLongitude",
                value: self.initial_longitude,
                min: -180.0,
                max: 180.0,
            });
        }
        if self.phone_model.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "phoneModel",
            });
        }
        Ok(())
    }
}

/// Device record returned after registration.
///
/// Only the fields the client displays are kept; the backend owns the rest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDevice {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub device_uid: Option<String>,
    #[serde(default)]
    pub registered_at: Option<String>,
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 and offset-less `YYYY-MM-DDTHH:MM:SS[.fff]` values, the
/// latter interpreted as UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(dt) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(dt);
    }
    let with_fraction =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let plain = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(value, with_fraction)
        .or_else(|_| PrimitiveDateTime::parse(value, plain))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
