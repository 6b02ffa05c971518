//! Trait abstraction over the endpoints a poller can fetch.
//!
//! [`RemoteSource`] lets the [`Poller`](crate::poller::Poller) run against the
//! real backend or against a [`MockSource`](crate::mock::MockSource) in tests.

use std::sync::Arc;

use async_trait::async_trait;

use safeair_types::{DeviceSummary, TrendResponse};

use crate::client::{ApiClient, SUMMARY_PATH, TRENDS_PATH};
use crate::error::Result;
use crate::trend::TrendQuery;

/// Something that can be fetched repeatedly.
///
/// # Example
///
/// ```ignore
/// use safeair_core::{RemoteSource, Result};
///
/// async fn print_count<S: RemoteSource<Output = Vec<DeviceSummary>>>(source: &S) -> Result<()> {
///     let devices = source.fetch().await?;
///     println!("{} devices", devices.len());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RemoteSource: Send + Sync + 'static {
    /// Parsed response type.
    type Output: Clone + Send + Sync + 'static;

    /// Short description used in logs (usually the endpoint path).
    fn describe(&self) -> String;

    /// Fetch the current value.
    async fn fetch(&self) -> Result<Self::Output>;
}

#[async_trait]
impl<S: RemoteSource> RemoteSource for Arc<S> {
    type Output = S::Output;

    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn fetch(&self) -> Result<Self::Output> {
        (**self).fetch().await
    }
}

/// `GET /api/devices/summary`.
#[derive(Debug, Clone)]
pub struct SummarySource {
    client: ApiClient,
}

impl SummarySource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for SummarySource {
    type Output = Vec<DeviceSummary>;

    fn describe(&self) -> String {
        SUMMARY_PATH.to_string()
    }

    async fn fetch(&self) -> Result<Self::Output> {
        self.client.device_summaries().await
    }
}

/// `GET /api/dashboard/device-locations` with a fixed query.
#[derive(Debug, Clone)]
pub struct TrendSource {
    client: ApiClient,
    query: TrendQuery,
}

impl TrendSource {
    pub fn new(client: ApiClient, query: TrendQuery) -> Self {
        Self { client, query }
    }

    /// The query this source sends.
    pub fn query(&self) -> &TrendQuery {
        &self.query
    }
}

#[async_trait]
impl RemoteSource for TrendSource {
    type Output = TrendResponse;

    fn describe(&self) -> String {
        format!("{TRENDS_PATH} ({})", self.query)
    }

    async fn fetch(&self) -> Result<Self::Output> {
        self.client.device_trends(&self.query).await
    }
}
