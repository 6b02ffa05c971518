//! HTTP client for the SafeAir backend REST API.
//!
//! # Example
//!
//! ```no_run
//! use safeair_core::{ApiClient, TrendQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("http://localhost:8080")?;
//!
//! let devices = client.device_summaries().await?;
//! println!("{} devices registered", devices.len());
//!
//! let trends = client.device_trends(&TrendQuery::day("Monday")).await?;
//! println!("{} devices with trend data", trends.device_locations_data.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use safeair_types::{DeviceSummary, RegisterDeviceRequest, RegisteredDevice, TrendResponse};

use crate::error::{Error, Result};
use crate::trend::TrendQuery;

/// Environment variable holding the backend base URL.
pub const LIVE_URL_ENV: &str = "SAFEAIR_LIVE_URL";

/// Fallback environment variable for the base URL.
pub const LEGACY_LIVE_URL_ENV: &str = "LIVE_URL";

/// Path of the device summary endpoint.
pub const SUMMARY_PATH: &str = "/api/devices/summary";

/// Path of the hourly trend endpoint.
pub const TRENDS_PATH: &str = "/api/dashboard/device-locations";

/// Path of the device registration endpoint.
pub const DEVICES_PATH: &str = "/api/devices";

/// Request timeout used by [`ApiClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest client that gives up on requests after `timeout`.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(Error::Request)
}

/// Base URL from the environment, if set and non-empty.
#[must_use]
pub fn live_url_from_env() -> Option<String> {
    [LIVE_URL_ENV, LEGACY_LIVE_URL_ENV]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// HTTP client for the SafeAir backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The backend base URL (e.g., "http://localhost:8080")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, http_client(DEFAULT_TIMEOUT)?)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    /// Create a client from `SAFEAIR_LIVE_URL`, falling back to `LIVE_URL`.
    pub fn from_env() -> Result<Self> {
        let url = live_url_from_env().ok_or(Error::NotConfigured)?;
        Self::new(&url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Latest state of every registered device.
    pub async fn device_summaries(&self) -> Result<Vec<DeviceSummary>> {
        let url = format!("{}{}", self.base_url, SUMMARY_PATH);
        self.get(&url, &[]).await
    }

    /// Hourly trends for a day or date range.
    pub async fn device_trends(&self, query: &TrendQuery) -> Result<TrendResponse> {
        let url = format!("{}{}", self.base_url, TRENDS_PATH);
        self.get(&url, &query.query_pairs()).await
    }

    /// Register a new device.
    ///
    /// The request is validated locally before it is sent.
    pub async fn register_device(
        &self,
        request: &RegisterDeviceRequest,
    ) -> Result<RegisteredDevice> {
        request.validate()?;
        let url = format!("{}{}", self.base_url, DEVICES_PATH);
        let response = self.send_json(&url, request).await?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(RegisteredDevice::default());
            }
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                message: format!(
                    "Failed to register device: {} {}. {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or(""),
                    body.trim()
                )
                .trim_end()
                .to_string(),
            })
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(url, ?query, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.to_string(),
                source: e,
            })?;

        self.handle_response(response).await
    }

    async fn send_json<B: Serialize>(&self, url: &str, body: &B) -> Result<reqwest::Response> {
        debug!(url, "POST");
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.to_string(),
                source: e,
            })
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();
    if base_url.is_empty() {
        return Err(Error::NotConfigured);
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }
    Ok(base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new("http://localhost:8080").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_normalizes_url() {
        let client = ApiClient::new(" https://api.safeair.example/ ").unwrap();
        assert_eq!(client.base_url(), "https://api.safeair.example");
    }

    #[test]
    fn test_client_invalid_url() {
        let result = ApiClient::new("localhost:8080");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_client_empty_url_is_not_configured() {
        assert!(matches!(ApiClient::new("  "), Err(Error::NotConfigured)));
    }

    #[tokio::test]
    async fn test_register_validates_before_sending() {
        // Nothing listens on port 9; validation must fail first.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let request = RegisterDeviceRequest::default();
        let result = client.register_device(&request).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
