//! Error types for safeair-core.
//!
//! Errors fall into three groups, and each is isolated to the feature that
//! raised it:
//!
//! | Group | Variants | Recovery |
//! |-------|----------|----------|
//! | Configuration missing | [`Error::NotConfigured`], [`Error::InvalidUrl`], [`Error::InvalidConfig`], [`Error::MapUnavailable`] | Fix configuration; the affected view stays degraded |
//! | Network / HTTP | [`Error::NotReachable`], [`Error::Api`], [`Error::Decode`], [`Error::Request`] | Transient; the next poll tick retries |
//! | Input | [`Error::Validation`] | Correct the input and resubmit |
//!
//! None of these are fatal to the process.

use thiserror::Error;

use safeair_types::ValidationError;

/// Message shown when no backend base URL is configured.
pub const NOT_CONFIGURED_MESSAGE: &str = "LIVE_URL not configured";

/// Errors that can occur while talking to the SafeAir backend.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No backend base URL is configured.
    #[error("LIVE_URL not configured")]
    NotConfigured,

    /// The configured base URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The backend could not be reached.
    #[error("Backend not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Request failed local validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The map provider cannot be used.
    #[error("{0}")]
    MapUnavailable(String),
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether the next poll cycle may succeed without user intervention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::NotReachable { .. } | Error::Api { .. } | Error::Decode(_) | Error::Request(_)
        )
    }

    /// HTTP status code, when the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short message suitable for a status line.
    ///
    /// Configuration errors are shown verbatim; transient errors are prefixed
    /// with the caller's context (e.g. "Unable to load live device data").
    #[must_use]
    pub fn user_message(&self, context: &str) -> String {
        if self.is_transient() {
            format!("{context}: {self}")
        } else {
            self.to_string()
        }
    }
}

/// Result type alias using safeair-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
