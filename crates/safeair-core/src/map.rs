//! Map markers, viewport fitting and the static-map URL builder.
//!
//! Markers are coloured by severity. With no markers the view falls back to
//! Colombo at zoom 10; a single marker is shown at street level.

use reqwest::Url;
use tracing::debug;

use safeair_types::{DeviceSummary, GeoLocation, Severity};

use crate::error::{Error, Result};
use crate::thresholds::Thresholds;
use crate::widget::remediation_for;

/// Environment variable holding the map-provider API key.
pub const MAPS_API_KEY_ENV: &str = "SAFEAIR_MAPS_API_KEY";

/// Shown when no map-provider key is configured.
pub const MISSING_KEY_MESSAGE: &str = "Please set SAFEAIR_MAPS_API_KEY";

/// Default map centre (Colombo).
pub const DEFAULT_CENTER: GeoLocation = GeoLocation {
    latitude: 6.9271,
    longitude: 79.8612,
};

/// Zoom used when there are no markers.
pub const DEFAULT_ZOOM: u8 = 10;

/// Zoom used when there is exactly one marker.
pub const SINGLE_MARKER_ZOOM: u8 = 15;

const MIN_ZOOM: u8 = 1;
const MAX_ZOOM: u8 = 18;

const STATIC_MAP_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Map-provider key from the environment, if set and non-empty.
#[must_use]
pub fn maps_api_key_from_env() -> Option<String> {
    std::env::var(MAPS_API_KEY_ENV)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// One device plotted on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub device_uid: String,
    pub location: GeoLocation,
    pub ppm: Option<f64>,
    pub severity: Severity,
    pub recorded_at: Option<String>,
}

impl MapMarker {
    /// Hover title, e.g. `SAT-0001: 742 ppm`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{}: {}", self.device_uid, self.ppm_text())
    }

    /// Lines of the info popup.
    #[must_use]
    pub fn info_lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.device_uid.clone(),
            format!("CO₂: {}", self.ppm_text()),
            format!("Location: {}", self.location),
            format!("Status: {}", self.severity),
        ];
        if let Some(recorded_at) = &self.recorded_at {
            lines.push(format!("Updated: {recorded_at}"));
        }
        lines
    }

    fn ppm_text(&self) -> String {
        match self.ppm {
            Some(ppm) if !ppm.is_nan() => format!("{} ppm", ppm.round()),
            _ => "No data".to_string(),
        }
    }
}

/// Markers for every device with a valid location.
#[must_use]
pub fn markers(devices: &[DeviceSummary], thresholds: &Thresholds) -> Vec<MapMarker> {
    devices
        .iter()
        .filter_map(|device| {
            let location = device.location.filter(GeoLocation::is_valid)?;
            Some(MapMarker {
                device_uid: device.device_uid.clone(),
                location,
                ppm: device.latest_co2,
                severity: thresholds.classify(device.latest_co2),
                recorded_at: device.latest_recorded_at.clone(),
            })
        })
        .collect()
}

/// Centre and zoom of a map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: GeoLocation,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl MapView {
    /// View that shows every marker.
    #[must_use]
    pub fn fit(markers: &[MapMarker]) -> Self {
        match markers {
            [] => Self::default(),
            [only] => Self {
                center: only.location,
                zoom: SINGLE_MARKER_ZOOM,
            },
            _ => {
                let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
                let (mut min_lng, mut max_lng) = (f64::INFINITY, f64::NEG_INFINITY);
                for marker in markers {
                    min_lat = min_lat.min(marker.location.latitude);
                    max_lat = max_lat.max(marker.location.latitude);
                    min_lng = min_lng.min(marker.location.longitude);
                    max_lng = max_lng.max(marker.location.longitude);
                }
                let span = (max_lat - min_lat).max((max_lng - min_lng) / 2.0);
                Self {
                    center: GeoLocation::new((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0),
                    zoom: zoom_for_span(span),
                }
            }
        }
    }

    /// Visible longitude width in degrees.
    #[must_use]
    pub fn lng_span(&self) -> f64 {
        (360.0 / 2f64.powi(i32::from(self.zoom) - 2)).min(360.0)
    }

    /// Visible `(x, y)` bounds as `[min, max]` pairs of longitude and latitude.
    #[must_use]
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let half_lng = self.lng_span() / 2.0;
        let half_lat = (self.lng_span() / 4.0).min(90.0);
        (
            [
                (self.center.longitude - half_lng).max(-180.0),
                (self.center.longitude + half_lng).min(180.0),
            ],
            [
                (self.center.latitude - half_lat).max(-90.0),
                (self.center.latitude + half_lat).min(90.0),
            ],
        )
    }

    #[must_use]
    pub fn zoom_in(self) -> Self {
        Self {
            zoom: self.zoom.saturating_add(1).min(MAX_ZOOM),
            ..self
        }
    }

    #[must_use]
    pub fn zoom_out(self) -> Self {
        Self {
            zoom: self.zoom.saturating_sub(1).max(MIN_ZOOM),
            ..self
        }
    }
}

/// Highest zoom whose viewport still covers `span` degrees of latitude.
fn zoom_for_span(span: f64) -> u8 {
    if span.is_nan() || span <= 0.0 {
        return SINGLE_MARKER_ZOOM;
    }
    let padded = span * 1.2;
    let zoom = (180.0 / padded).log2().floor() + 2.0;
    (zoom.clamp(f64::from(MIN_ZOOM), f64::from(SINGLE_MARKER_ZOOM))) as u8
}

/// Request for a static map image with severity-coloured markers.
#[derive(Debug, Clone)]
pub struct StaticMap {
    view: MapView,
    width: u32,
    height: u32,
    markers: Vec<(GeoLocation, Severity)>,
}

impl StaticMap {
    /// Build a request showing `markers` in `view`.
    pub fn new(view: MapView, markers: &[MapMarker]) -> Self {
        Self {
            view,
            width: 640,
            height: 400,
            markers: markers.iter().map(|m| (m.location, m.severity)).collect(),
        }
    }

    /// Set the image size in pixels.
    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Image URL. Fails with [`Error::MapUnavailable`] without an API key.
    pub fn url(&self, api_key: Option<&str>) -> Result<Url> {
        let key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::MapUnavailable(MISSING_KEY_MESSAGE.to_string()))?;

        let mut params = vec![
            (
                "center".to_string(),
                format!(
                    "{:.6},{:.6}",
                    self.view.center.latitude, self.view.center.longitude
                ),
            ),
            ("zoom".to_string(), self.view.zoom.to_string()),
            ("size".to_string(), format!("{}x{}", self.width, self.height)),
        ];
        for severity in Severity::ALL {
            let points: Vec<String> = self
                .markers
                .iter()
                .filter(|(_, s)| *s == severity)
                .map(|(loc, _)| format!("{:.6},{:.6}", loc.latitude, loc.longitude))
                .collect();
            if points.is_empty() {
                continue;
            }
            let color = severity.hex_color().replacen('#', "0x", 1);
            params.push((
                "markers".to_string(),
                format!("color:{}|{}", color, points.join("|")),
            ));
        }
        params.push(("key".to_string(), key.to_string()));

        Url::parse_with_params(STATIC_MAP_ENDPOINT, &params)
            .map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    /// Ask the provider for the image and report why it would not render.
    pub async fn verify(&self, client: &reqwest::Client, api_key: Option<&str>) -> Result<()> {
        let url = self.url(api_key)?;
        debug!(zoom = self.view.zoom, markers = self.markers.len(), "Checking static map");
        let response = client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::MapUnavailable(remediation_for(&body).to_string()))
    }
}
