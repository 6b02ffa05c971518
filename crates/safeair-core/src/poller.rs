//! Fixed-interval polling of a [`RemoteSource`] with cancellation.
//!
//! A poller is one spawned task that fetches its source immediately and then
//! on every tick, publishing a [`PollState`] on a `tokio::sync::watch`
//! channel. Cycles never overlap: the task awaits each fetch before waiting
//! for the next tick, and missed ticks are skipped, so the last published
//! response is always the last one requested.
//!
//! Failures keep the previous data and set an error message; the next tick
//! is the retry. Stopping the poller (or dropping its [`PollHandle`]) cancels
//! any in-flight fetch and nothing is published afterwards.
//!
//! # Example
//!
//! ```no_run
//! use safeair_core::{ApiClient, Poller, PollerOptions, SummarySource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::from_env()?;
//! let mut handle = Poller::spawn(SummarySource::new(client), PollerOptions::default());
//!
//! while handle.changed().await {
//!     let state = handle.state();
//!     if let Some(devices) = &state.data {
//!         println!("{} devices", devices.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use time::OffsetDateTime;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, NOT_CONFIGURED_MESSAGE, Result};
use crate::source::RemoteSource;

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Options for a poller.
///
/// Use the builder pattern for convenient configuration:
///
/// ```
/// use std::time::Duration;
/// use safeair_core::PollerOptions;
///
/// let options = PollerOptions::builder()
///     .interval(Duration::from_secs(5))
///     .error_context("Unable to load device trends")
///     .build();
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PollerOptions {
    /// Time between the start of consecutive polls.
    /// Default: 3 seconds.
    pub interval: Duration,
    /// Prefix of the error message published on fetch failure.
    pub error_context: String,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            error_context: "Unable to load data".to_string(),
        }
    }
}

impl PollerOptions {
    /// Create a new builder for PollerOptions.
    pub fn builder() -> PollerOptionsBuilder {
        PollerOptionsBuilder::default()
    }

    /// Create options with a specific interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::invalid_config("poll interval must be > 0"));
        }
        Ok(())
    }
}

/// Builder for PollerOptions.
#[derive(Debug, Clone, Default)]
pub struct PollerOptionsBuilder {
    options: PollerOptions,
}

impl PollerOptionsBuilder {
    /// Set the polling interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    /// Set the error message prefix.
    #[must_use]
    pub fn error_context(mut self, context: impl Into<String>) -> Self {
        self.options.error_context = context.into();
        self
    }

    /// Build the PollerOptions.
    #[must_use]
    pub fn build(self) -> PollerOptions {
        self.options
    }
}

/// Snapshot of a poller's view of the remote state.
#[derive(Debug, Clone)]
pub struct PollState<T> {
    /// Last successfully fetched value. Kept across failures.
    pub data: Option<T>,
    /// Error of the most recent cycle, cleared by the next success.
    pub error: Option<String>,
    /// When `data` was last replaced.
    pub last_updated: Option<OffsetDateTime>,
    /// A fetch is in flight.
    pub loading: bool,
    /// Completed cycles, successful or not.
    pub cycles: u64,
    /// Failures since the last success.
    pub consecutive_failures: u32,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            last_updated: None,
            loading: false,
            cycles: 0,
            consecutive_failures: 0,
        }
    }
}

impl<T> PollState<T> {
    /// The fixed state of a poller without a base URL.
    pub fn not_configured() -> Self {
        Self {
            error: Some(NOT_CONFIGURED_MESSAGE.to_string()),
            ..Default::default()
        }
    }

    /// Data is present but the latest cycle failed.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }
}

/// Entry point for spawning pollers.
#[derive(Debug)]
pub struct Poller;

impl Poller {
    /// Spawn a poller for `source`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<S: RemoteSource>(source: S, options: PollerOptions) -> PollHandle<S::Output> {
        let (tx, rx) = watch::channel(PollState::default());
        let cancel = CancellationToken::new();
        let refresh = Arc::new(Notify::new());

        let task = tokio::spawn(run(source, options, tx, cancel.clone(), Arc::clone(&refresh)));

        PollHandle {
            state: rx,
            cancel,
            refresh,
            task: Some(task),
        }
    }

    /// A handle whose state is permanently "LIVE_URL not configured".
    ///
    /// No task is spawned and no request is ever made.
    pub fn unconfigured<T: Clone>() -> PollHandle<T> {
        let (_tx, rx) = watch::channel(PollState::not_configured());
        let cancel = CancellationToken::new();
        cancel.cancel();
        PollHandle {
            state: rx,
            cancel,
            refresh: Arc::new(Notify::new()),
            task: None,
        }
    }

    /// Spawn a poller, or an unconfigured handle when `source` is `None`.
    pub fn spawn_or_unconfigured<S: RemoteSource>(
        source: Option<S>,
        options: PollerOptions,
    ) -> PollHandle<S::Output> {
        match source {
            Some(source) => Self::spawn(source, options),
            None => Self::unconfigured(),
        }
    }
}

async fn run<S: RemoteSource>(
    source: S,
    options: PollerOptions,
    tx: watch::Sender<PollState<S::Output>>,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
) {
    let target = source.describe();
    let period = if options.interval.is_zero() {
        warn!(source = %target, "Poll interval is zero, using default");
        DEFAULT_POLL_INTERVAL
    } else {
        options.interval
    };
    info!(source = %target, interval = ?period, "Poller started");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            _ = refresh.notified() => ticker.reset(),
        }

        tx.send_modify(|state| state.loading = true);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = source.fetch() => result,
        };
        if cancel.is_cancelled() {
            break;
        }

        match result {
            Ok(data) => {
                debug!(source = %target, "Poll succeeded");
                let now = OffsetDateTime::now_utc();
                tx.send_modify(|state| {
                    state.data = Some(data);
                    state.error = None;
                    state.last_updated = Some(now);
                    state.loading = false;
                    state.cycles += 1;
                    state.consecutive_failures = 0;
                });
            }
            Err(e) => {
                let message = e.user_message(&options.error_context);
                tx.send_modify(|state| {
                    state.error = Some(message);
                    state.loading = false;
                    state.cycles += 1;
                    state.consecutive_failures += 1;
                });
                warn!(
                    source = %target,
                    failures = tx.borrow().consecutive_failures,
                    "Poll failed: {}",
                    e
                );
            }
        }
    }

    info!(source = %target, "Poller stopped");
}

/// Handle to a running poller.
///
/// Dropping the handle stops the poller.
#[derive(Debug)]
pub struct PollHandle<T> {
    state: watch::Receiver<PollState<T>>,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl<T: Clone> PollHandle<T> {
    /// Current state.
    pub fn state(&self) -> PollState<T> {
        self.state.borrow().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&PollState<T>) -> R) -> R {
        f(&self.state.borrow())
    }

    /// A receiver for the state channel.
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.state.clone()
    }

    /// Wait for the next state change.
    ///
    /// Returns `false` once the poller has stopped and no more updates will come.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }

    /// Stream of states, one per change.
    pub fn updates(&self) -> impl Stream<Item = PollState<T>> + use<T> {
        stream::unfold(self.state.clone(), |mut rx| async move {
            rx.changed().await.ok()?;
            let state = rx.borrow_and_update().clone();
            Some((state, rx))
        })
    }
}

impl<T> PollHandle<T> {
    /// Poll again now instead of waiting for the next tick.
    ///
    /// If a fetch is in flight, the next cycle starts as soon as it completes.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Stop polling. Any in-flight response is discarded.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether the poller has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the poller and wait for its task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!("Poller task ended abnormally: {}", e);
        }
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSource, sample_devices};
    use futures::StreamExt;
    use safeair_types::DeviceSummary;
    use tokio::time::{Instant, sleep};

    fn fast_options() -> PollerOptions {
        PollerOptions::builder()
            .interval(Duration::from_secs(3))
            .error_context("Unable to load live device data")
            .build()
    }

    #[test]
    fn test_options_validation() {
        assert!(PollerOptions::default().validate().is_ok());
        assert_eq!(PollerOptions::default().interval, Duration::from_secs(3));
        assert!(PollerOptions::with_interval(Duration::ZERO).validate().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_is_immediate() {
        let source = Arc::new(MockSource::new(sample_devices()));
        let handle = Poller::spawn(Arc::clone(&source), fast_options());
        let start = Instant::now();

        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.cycles >= 1).await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(1));
        let state = handle.state();
        assert_eq!(state.data.map(|d| d.len()), Some(4));
        assert!(state.error.is_none());
        assert!(state.last_updated.is_some());
        assert!(!state.loading);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_fixed_interval() {
        let source = Arc::new(MockSource::new(sample_devices()));
        let handle = Poller::spawn(Arc::clone(&source), fast_options());
        let start = Instant::now();

        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.cycles >= 3).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(7), "elapsed {elapsed:?}");
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_data() {
        let source = Arc::new(MockSource::new(sample_devices()));
        let handle = Poller::spawn(Arc::clone(&source), fast_options());
        let mut rx = handle.subscribe();

        rx.wait_for(|s| s.cycles >= 1).await.unwrap();
        source.set_should_fail(true);
        rx.wait_for(|s| s.cycles >= 2).await.unwrap();

        let state = handle.state();
        assert!(state.is_stale());
        assert_eq!(state.data.as_ref().map(Vec::len), Some(4));
        let error = state.error.unwrap();
        assert!(error.starts_with("Unable to load live device data"), "{error}");
        assert_eq!(state.consecutive_failures, 1);

        source.set_should_fail(false);
        rx.wait_for(|s| s.cycles >= 3).await.unwrap();
        let state = handle.state();
        assert!(state.error.is_none());
        assert_eq!(state.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_before_any_data() {
        let source = Arc::new(MockSource::new(sample_devices()));
        source.set_should_fail(true);
        let handle = Poller::spawn(Arc::clone(&source), fast_options());
        let mut rx = handle.subscribe();

        rx.wait_for(|s| s.cycles >= 2).await.unwrap();
        let state = handle.state();
        assert!(state.data.is_none());
        assert!(state.error.is_some());
        assert_eq!(state.consecutive_failures, 2);
        assert!(state.last_updated.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_in_flight_response() {
        let source = Arc::new(MockSource::new(sample_devices()));
        source.set_latency(Duration::from_secs(5));
        let handle = Poller::spawn(Arc::clone(&source), fast_options());

        sleep(Duration::from_secs(1)).await;
        assert_eq!(source.fetch_count(), 1);

        handle.stop();
        assert!(handle.is_stopped());
        sleep(Duration::from_secs(30)).await;

        let state = handle.state();
        assert!(state.data.is_none());
        assert_eq!(state.cycles, 0);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let source = Arc::new(MockSource::new(sample_devices()));
        source.set_latency(Duration::from_secs(5));
        let handle = Poller::spawn(Arc::clone(&source), fast_options());
        let rx = handle.subscribe();

        sleep(Duration::from_secs(1)).await;
        drop(handle);
        sleep(Duration::from_secs(30)).await;

        assert!(rx.borrow().data.is_none());
        assert_eq!(rx.borrow().cycles, 0);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_skips_wait() {
        let source = Arc::new(MockSource::new(sample_devices()));
        let handle = Poller::spawn(
            Arc::clone(&source),
            PollerOptions::with_interval(Duration::from_secs(60)),
        );
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.cycles >= 1).await.unwrap();

        let start = Instant::now();
        handle.refresh_now();
        rx.wait_for(|s| s.cycles >= 2).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(60));
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_task() {
        let source = Arc::new(MockSource::new(sample_devices()));
        let handle = Poller::spawn(Arc::clone(&source), fast_options());
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.cycles >= 1).await.unwrap();

        handle.shutdown().await;
        // The sender is gone once the task has exited.
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_stream() {
        let source = Arc::new(MockSource::new(sample_devices()));
        let handle = Poller::spawn(Arc::clone(&source), fast_options());

        let completed: Vec<PollState<Vec<DeviceSummary>>> = handle
            .updates()
            .filter(|s| futures::future::ready(!s.loading))
            .take(2)
            .collect()
            .await;
        assert_eq!(completed.len(), 2);
        assert!(completed.iter().all(|s| s.data.is_some()));
    }

    #[tokio::test]
    async fn test_unconfigured_never_fetches() {
        let mut handle = Poller::unconfigured::<Vec<DeviceSummary>>();
        let state = handle.state();
        assert_eq!(state.error.as_deref(), Some("LIVE_URL not configured"));
        assert!(state.data.is_none());
        assert!(!state.loading);
        assert!(handle.is_stopped());
        assert!(!handle.changed().await);
    }

    #[tokio::test]
    async fn test_spawn_or_unconfigured() {
        let handle = Poller::spawn_or_unconfigured::<MockSource<u8>>(None, fast_options());
        assert_eq!(
            handle.state().error.as_deref(),
            Some(NOT_CONFIGURED_MESSAGE)
        );
    }
}
