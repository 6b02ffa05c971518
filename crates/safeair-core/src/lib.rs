//! Client library for the SafeAir CO₂ dashboard backend.
//!
//! This crate talks to the SafeAir backend REST API and provides the pieces
//! every dashboard view is built from.
//!
//! # Features
//!
//! - **REST client**: device summaries, hourly trends, device registration
//! - **Polling**: fixed-interval refresh with cancellation and stale-data retention
//! - **Classification**: configurable severity thresholds
//! - **View helpers**: fleet statistics, trend bars, map markers and viewports
//! - **Widget loading**: an explicit load-state machine for the map widget
//!
//! # Quick Start
//!
//! ```no_run
//! use safeair_core::{ApiClient, FleetStats, Thresholds};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::from_env()?;
//!     let devices = client.device_summaries().await?;
//!
//!     let stats = FleetStats::compute(&devices, &Thresholds::default());
//!     println!("{} of {} devices reporting", stats.with_data, stats.total);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod display;
pub mod error;
pub mod map;
pub mod mock;
pub mod poller;
pub mod source;
pub mod stats;
pub mod thresholds;
pub mod trend;
pub mod widget;

pub use safeair_types as types;

pub use client::{
    ApiClient, DEFAULT_TIMEOUT, LEGACY_LIVE_URL_ENV, LIVE_URL_ENV, http_client, live_url_from_env,
};
pub use error::{Error, NOT_CONFIGURED_MESSAGE, Result};
pub use map::{MapMarker, MapView, StaticMap, maps_api_key_from_env};
pub use mock::MockSource;
pub use poller::{PollHandle, PollState, Poller, PollerOptions, PollerOptionsBuilder};
pub use source::{RemoteSource, SummarySource, TrendSource};
pub use stats::FleetStats;
pub use thresholds::Thresholds;
pub use trend::{BarScale, TrendQuery};
pub use widget::{FrameAction, LoadState, Surface, WidgetLoader};
