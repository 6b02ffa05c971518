//! Mock source implementation for testing.
//!
//! [`MockSource`] implements [`RemoteSource`] so pollers and views can be
//! exercised without a backend.
//!
//! # Features
//!
//! - **Failure injection**: fail every fetch, or only the next `n`
//! - **Latency simulation**: delay each fetch to model a slow backend
//! - **Response swapping**: change the returned value between cycles

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use safeair_types::{DeviceSummary, DeviceTrend, GeoLocation, HourlyPpmPoint, TrendResponse};

use crate::error::{Error, Result};
use crate::source::RemoteSource;

/// A scripted [`RemoteSource`].
///
/// # Example
///
/// ```
/// use safeair_core::{MockSource, RemoteSource};
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockSource::new(vec![1, 2, 3]);
///     assert_eq!(source.fetch().await.unwrap(), vec![1, 2, 3]);
///
///     source.set_should_fail(true);
///     assert!(source.fetch().await.is_err());
/// }
/// ```
pub struct MockSource<T> {
    response: RwLock<T>,
    fail_message: RwLock<String>,
    should_fail: AtomicBool,
    /// Failures left before fetches succeed again.
    remaining_failures: AtomicU32,
    /// Simulated latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    fetch_count: AtomicU32,
}

impl<T> std::fmt::Debug for MockSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T> MockSource<T> {
    /// Create a source that returns `response`.
    pub fn new(response: T) -> Self {
        Self {
            response: RwLock::new(response),
            fail_message: RwLock::new("Internal Server Error".to_string()),
            should_fail: AtomicBool::new(false),
            remaining_failures: AtomicU32::new(0),
            latency_ms: AtomicU64::new(0),
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Replace the returned value.
    pub async fn set_response(&self, response: T) {
        *self.response.write().await = response;
    }

    /// Make every fetch fail (or succeed again).
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }

    /// Set the message carried by injected failures.
    pub async fn set_fail_message(&self, message: &str) {
        *self.fail_message.write().await = message.to_string();
    }

    /// Fail only the next `count` fetches.
    pub fn fail_next(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Delay each fetch by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of fetches started.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    fn take_failure(&self) -> bool {
        if self.should_fail.load(Ordering::Relaxed) {
            return true;
        }
        self.remaining_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl<T> RemoteSource for MockSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn describe(&self) -> String {
        "mock".to_string()
    }

    async fn fetch(&self) -> Result<T> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.take_failure() {
            return Err(Error::Api {
                status: 500,
                message: self.fail_message.read().await.clone(),
            });
        }
        Ok(self.response.read().await.clone())
    }
}

/// A small fleet covering every severity band.
#[must_use]
pub fn sample_devices() -> Vec<DeviceSummary> {
    let device = |id: i64, ppm: Option<f64>, location: Option<(f64, f64)>| DeviceSummary {
        id,
        device_uid: format!("SAT-{id:04}"),
        registered_at: "2025-01-10T08:00:00".to_string(),
        location: location.map(|(lat, lng)| GeoLocation::new(lat, lng)),
        latest_co2: ppm,
        latest_recorded_at: ppm.map(|_| "2025-01-12T09:30:00Z".to_string()),
    };
    vec![
        device(1, Some(742.0), Some((6.9271, 79.8612))),
        device(2, Some(1132.0), Some((6.9497, 79.8563))),
        device(3, Some(850.0), Some((7.2906, 80.6337))),
        device(4, None, None),
    ]
}

/// Trend data for two devices over a few hours.
#[must_use]
pub fn sample_trends() -> TrendResponse {
    let points = |values: &[f64]| -> Vec<HourlyPpmPoint> {
        let peak = values.iter().copied().fold(0.0, f64::max);
        values
            .iter()
            .enumerate()
            .map(|(i, &ppm)| HourlyPpmPoint {
                time: format!("{:02}:00", 8 + i),
                ppm_value: ppm,
                is_peak: ppm == peak,
                hour: 8 + i as u8,
            })
            .collect()
    };
    TrendResponse {
        current_day_selected: "Today".to_string(),
        available_days: vec!["Today".to_string(), "Monday".to_string()],
        device_locations_data: vec![
            DeviceTrend {
                id: "loc-1".to_string(),
                name: "Industrial Plant".to_string(),
                device_uid: "SAT-0002".to_string(),
                status: "Active".to_string(),
                alert_level: "Critical".to_string(),
                latitude: Some(6.9497),
                longitude: Some(79.8563),
                hourly_ppm_data: points(&[820.0, 1132.0, 990.0, 760.0]),
            },
            DeviceTrend {
                id: "loc-2".to_string(),
                name: "City Office".to_string(),
                device_uid: "SAT-0001".to_string(),
                status: "Active".to_string(),
                alert_level: "Normal".to_string(),
                latitude: Some(6.9271),
                longitude: Some(79.8612),
                hourly_ppm_data: points(&[540.0, 610.0, 742.0, 700.0]),
            },
        ],
    }
}
