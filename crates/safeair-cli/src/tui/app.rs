//! Application state for the TUI dashboard.
//!
//! Every tab reads from a [`PollHandle`]; the app never awaits the network.
//! The summary poller feeds the Live, Devices and Map tabs, the trend poller
//! feeds the Trends tab and is replaced whenever the selected day changes.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use safeair_core::map::markers;
use safeair_core::trend::{available_days, cycle_day, filter_devices};
use safeair_core::widget::DEFAULT_MAX_FRAMES;
use safeair_core::{
    ApiClient, FleetStats, FrameAction, MapMarker, MapView, PollHandle, Poller, PollerOptions,
    Surface, SummarySource, Thresholds, TrendQuery, TrendSource, WidgetLoader,
};
use safeair_types::{DeviceSummary, DeviceTrend, TrendResponse};
use tracing::{debug, info};

use super::ui::theme::AppTheme;

/// How long status messages stay visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(4);

/// Fleet averages kept for the Live tab sparkline.
const AVERAGE_HISTORY_LEN: usize = 120;

/// Most zoom steps away from the fitted view.
const MAX_ZOOM_OFFSET: i8 = 12;

/// Settings the dashboard starts with.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    /// Backend base URL. `None` shows every view as not configured.
    pub base_url: Option<String>,
    /// Map provider key, used for the static map link.
    pub maps_api_key: Option<String>,
    pub thresholds: Thresholds,
    pub poll_interval: Duration,
}

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Live,
    Devices,
    Trends,
    Map,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Live, Tab::Devices, Tab::Trends, Tab::Map];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Tab::Live => "Live",
            Tab::Devices => "Devices",
            Tab::Trends => "Trends",
            Tab::Map => "Map",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    #[must_use]
    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    #[must_use]
    pub fn previous(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Main application state.
pub struct App {
    pub active_tab: Tab,
    pub theme: Theme,
    pub thresholds: Thresholds,
    /// `GET /api/devices/summary` poller.
    pub summaries: PollHandle<Vec<DeviceSummary>>,
    /// `GET /api/dashboard/device-locations` poller for `trend_day`.
    pub trends: PollHandle<TrendResponse>,
    /// Day requested from the trend endpoint; `None` lets the backend pick.
    pub trend_day: Option<String>,
    pub maps_api_key: Option<String>,
    /// Backend URL error found at startup.
    pub startup_error: Option<String>,
    pub selected_device: usize,
    pub selected_location: usize,
    pub selected_marker: usize,
    /// Trend search query.
    pub search: String,
    pub editing_search: bool,
    pub show_help: bool,
    pub show_popup: bool,
    /// Zoom steps relative to the fitted map view.
    pub map_zoom_offset: i8,
    pub map_loader: WidgetLoader,
    /// Recent fleet averages in ppm, oldest first.
    pub average_history: VecDeque<u64>,
    pub should_quit: bool,
    client: Option<ApiClient>,
    poll_interval: Duration,
    map_surface: Option<Surface>,
    seen_summary_cycles: u64,
    status_messages: Vec<(String, Instant)>,
}

impl App {
    /// Create the app and start its pollers.
    pub fn new(options: TuiOptions) -> Self {
        let (client, startup_error) = match options.base_url.as_deref().map(ApiClient::new) {
            Some(Ok(client)) => (Some(client), None),
            Some(Err(e)) => (None, Some(e.to_string())),
            None => (None, None),
        };
        if let Some(client) = &client {
            info!(base_url = client.base_url(), "Dashboard polling backend");
        }

        let summaries = Poller::spawn_or_unconfigured(
            client.clone().map(SummarySource::new),
            summary_options(options.poll_interval),
        );
        let trends = Poller::spawn_or_unconfigured(
            client
                .clone()
                .map(|c| TrendSource::new(c, TrendQuery::Latest)),
            trend_options(options.poll_interval),
        );

        let mut app = Self::with_handles(options, summaries, trends);
        app.client = client;
        app.startup_error = startup_error;
        app
    }

    /// Create the app around existing pollers.
    pub fn with_handles(
        options: TuiOptions,
        summaries: PollHandle<Vec<DeviceSummary>>,
        trends: PollHandle<TrendResponse>,
    ) -> Self {
        let mut map_loader = WidgetLoader::new(DEFAULT_MAX_FRAMES);
        map_loader.start(None);
        // The world map outline is compiled in.
        map_loader.library_loaded();

        Self {
            active_tab: Tab::default(),
            theme: Theme::default(),
            thresholds: options.thresholds,
            summaries,
            trends,
            trend_day: None,
            maps_api_key: options.maps_api_key,
            startup_error: None,
            selected_device: 0,
            selected_location: 0,
            selected_marker: 0,
            search: String::new(),
            editing_search: false,
            show_help: false,
            show_popup: false,
            map_zoom_offset: 0,
            map_loader,
            average_history: VecDeque::with_capacity(AVERAGE_HISTORY_LEN),
            should_quit: false,
            client: None,
            poll_interval: options.poll_interval,
            map_surface: None,
            seen_summary_cycles: 0,
            status_messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn app_theme(&self) -> AppTheme {
        match self.theme {
            Theme::Dark => AppTheme::dark(),
            Theme::Light => AppTheme::light(),
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
    }

    /// Per-frame bookkeeping: history, selections, map loading, messages.
    pub fn tick(&mut self) {
        let (cycles, average) = self.summaries.with_state(|state| {
            let average = state
                .data
                .as_ref()
                .and_then(|d| FleetStats::compute(d, &self.thresholds).average);
            (state.cycles, average)
        });
        if cycles != self.seen_summary_cycles {
            self.seen_summary_cycles = cycles;
            if let Some(average) = average {
                if self.average_history.len() == AVERAGE_HISTORY_LEN {
                    self.average_history.pop_front();
                }
                self.average_history.push_back(average.round().max(0.0) as u64);
            }
        }

        self.clamp_selections();

        if self.active_tab == Tab::Map {
            match self.map_loader.frame(self.map_surface) {
                FrameAction::Construct => {
                    debug!(surface = ?self.map_surface, "Map canvas attached");
                    self.map_loader.construct_succeeded();
                }
                FrameAction::Wait | FrameAction::Idle => {}
            }
        }

        self.status_messages
            .retain(|(_, at)| at.elapsed() < STATUS_MESSAGE_TTL);
    }

    /// Record the size of the map canvas for the next frame.
    pub fn set_map_surface(&mut self, surface: Option<Surface>) {
        self.map_surface = surface;
    }

    // ------------------------------------------------------------------
    // Data views
    // ------------------------------------------------------------------

    /// Devices from the last successful summary poll.
    #[must_use]
    pub fn devices(&self) -> Vec<DeviceSummary> {
        self.summaries
            .with_state(|s| s.data.clone())
            .unwrap_or_default()
    }

    /// Statistics over the current devices, if any poll succeeded.
    #[must_use]
    pub fn fleet_stats(&self) -> Option<FleetStats> {
        self.summaries.with_state(|s| {
            s.data
                .as_ref()
                .map(|d| FleetStats::compute(d, &self.thresholds))
        })
    }

    /// Markers for devices with a location.
    #[must_use]
    pub fn map_markers(&self) -> Vec<MapMarker> {
        self.summaries.with_state(|s| {
            s.data
                .as_deref()
                .map(|d| markers(d, &self.thresholds))
                .unwrap_or_default()
        })
    }

    /// Fitted view adjusted by the user's zoom steps.
    #[must_use]
    pub fn map_view(&self, markers: &[MapMarker]) -> MapView {
        let mut view = MapView::fit(markers);
        for _ in 0..self.map_zoom_offset.unsigned_abs() {
            view = if self.map_zoom_offset > 0 {
                view.zoom_in()
            } else {
                view.zoom_out()
            };
        }
        view
    }

    /// Marker under the cursor.
    #[must_use]
    pub fn selected_marker(&self) -> Option<MapMarker> {
        self.map_markers().into_iter().nth(self.selected_marker)
    }

    /// Trend locations matching the search.
    #[must_use]
    pub fn filtered_trends(&self) -> Vec<DeviceTrend> {
        self.trends.with_state(|s| {
            s.data
                .as_ref()
                .map(|r| {
                    filter_devices(&r.device_locations_data, &self.search)
                        .into_iter()
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Day shown on the Trends tab.
    #[must_use]
    pub fn current_day(&self) -> Option<String> {
        self.trend_day.clone().or_else(|| {
            self.trends.with_state(|s| {
                s.data
                    .as_ref()
                    .map(|r| r.current_day_selected.clone())
                    .filter(|d| !d.is_empty())
            })
        })
    }

    /// Days the selector cycles through.
    #[must_use]
    pub fn days(&self) -> Vec<String> {
        self.trends.with_state(|s| match &s.data {
            Some(response) => available_days(response),
            None => available_days(&TrendResponse::default()),
        })
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Poll both endpoints now.
    pub fn refresh(&mut self) {
        self.summaries.refresh_now();
        self.trends.refresh_now();
        if self.active_tab == Tab::Map && self.map_loader.state().error().is_some() {
            self.map_loader.reset();
            self.map_loader.start(None);
            self.map_loader.library_loaded();
        }
        self.push_status_message("Refreshing...".to_string());
    }

    /// Move to the next or previous trend day and restart the trend poller.
    pub fn change_day(&mut self, forward: bool) {
        let days = self.days();
        let current = self.current_day().unwrap_or_default();
        let Some(day) = cycle_day(&days, &current, forward) else {
            return;
        };
        info!(%day, "Switching trend day");
        self.trends = Poller::spawn_or_unconfigured(
            self.client
                .clone()
                .map(|c| TrendSource::new(c, TrendQuery::day(day.clone()))),
            trend_options(self.poll_interval),
        );
        self.trend_day = Some(day);
        self.selected_location = 0;
    }

    pub fn select_next(&mut self) {
        match self.active_tab {
            Tab::Live | Tab::Devices => {
                self.selected_device = next_index(self.selected_device, self.device_count());
            }
            Tab::Trends => {
                self.selected_location =
                    next_index(self.selected_location, self.filtered_trends().len());
            }
            Tab::Map => {
                self.selected_marker = next_index(self.selected_marker, self.map_markers().len());
            }
        }
    }

    pub fn select_previous(&mut self) {
        match self.active_tab {
            Tab::Live | Tab::Devices => {
                self.selected_device = previous_index(self.selected_device, self.device_count());
            }
            Tab::Trends => {
                self.selected_location =
                    previous_index(self.selected_location, self.filtered_trends().len());
            }
            Tab::Map => {
                self.selected_marker =
                    previous_index(self.selected_marker, self.map_markers().len());
            }
        }
    }

    pub fn zoom_in(&mut self) {
        self.map_zoom_offset = (self.map_zoom_offset + 1).min(MAX_ZOOM_OFFSET);
    }

    pub fn zoom_out(&mut self) {
        self.map_zoom_offset = (self.map_zoom_offset - 1).max(-MAX_ZOOM_OFFSET);
    }

    pub fn start_search(&mut self) {
        self.active_tab = Tab::Trends;
        self.editing_search = true;
    }

    pub fn search_push(&mut self, c: char) {
        self.search.push(c);
        self.selected_location = 0;
    }

    pub fn search_pop(&mut self) {
        self.search.pop();
        self.selected_location = 0;
    }

    pub fn finish_search(&mut self) {
        self.editing_search = false;
    }

    pub fn cancel_search(&mut self) {
        self.search.clear();
        self.editing_search = false;
        self.selected_location = 0;
    }

    pub fn push_status_message(&mut self, message: String) {
        self.status_messages.push((message, Instant::now()));
    }

    #[must_use]
    pub fn current_status_message(&self) -> Option<&str> {
        self.status_messages.last().map(|(m, _)| m.as_str())
    }

    /// Stop both pollers and wait for them.
    pub async fn shutdown(self) {
        self.summaries.shutdown().await;
        self.trends.shutdown().await;
    }

    fn device_count(&self) -> usize {
        self.summaries
            .with_state(|s| s.data.as_ref().map_or(0, Vec::len))
    }

    fn clamp_selections(&mut self) {
        let devices = self.device_count();
        let locations = self.filtered_trends().len();
        let markers = self.map_markers().len();
        self.selected_device = self.selected_device.min(devices.saturating_sub(1));
        self.selected_location = self.selected_location.min(locations.saturating_sub(1));
        self.selected_marker = self.selected_marker.min(markers.saturating_sub(1));
        if markers == 0 {
            self.show_popup = false;
        }
    }
}

fn summary_options(interval: Duration) -> PollerOptions {
    PollerOptions::builder()
        .interval(interval)
        .error_context("Unable to load live device data")
        .build()
}

fn trend_options(interval: Duration) -> PollerOptions {
    PollerOptions::builder()
        .interval(interval)
        .error_context("Unable to load device trends")
        .build()
}

/// Next index, wrapping at `len`.
fn next_index(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

/// Previous index, wrapping at 0.
fn previous_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeair_core::MockSource;
    use safeair_core::mock::{sample_devices, sample_trends};

    fn options() -> TuiOptions {
        TuiOptions {
            base_url: None,
            maps_api_key: None,
            thresholds: Thresholds::default(),
            poll_interval: Duration::from_secs(3),
        }
    }

    async fn app_with_samples() -> App {
        let mut summaries = Poller::spawn(
            MockSource::new(sample_devices()),
            PollerOptions::with_interval(Duration::from_secs(60)),
        );
        let mut trends = Poller::spawn(
            MockSource::new(sample_trends()),
            PollerOptions::with_interval(Duration::from_secs(60)),
        );
        while summaries.state().cycles == 0 {
            assert!(summaries.changed().await);
        }
        while trends.state().cycles == 0 {
            assert!(trends.changed().await);
        }
        App::with_handles(options(), summaries, trends)
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Live.next(), Tab::Devices);
        assert_eq!(Tab::Map.next(), Tab::Live);
        assert_eq!(Tab::Live.previous(), Tab::Map);
        assert_eq!(Tab::Trends.index(), 2);
    }

    #[test]
    fn test_index_wrapping() {
        assert_eq!(next_index(2, 3), 0);
        assert_eq!(next_index(0, 0), 0);
        assert_eq!(previous_index(0, 3), 2);
        assert_eq!(previous_index(0, 0), 0);
    }

    #[test]
    fn test_without_backend_views_are_not_configured() {
        let app = App::new(options());
        let state = app.summaries.state();
        assert_eq!(state.error.as_deref(), Some("LIVE_URL not configured"));
        assert!(app.devices().is_empty());
        assert!(app.fleet_stats().is_none());
        assert!(app.startup_error.is_none());
        // The day selector still offers the fallback days.
        assert_eq!(app.days().len(), 8);
    }

    #[test]
    fn test_invalid_base_url_is_reported() {
        let app = App::new(TuiOptions {
            base_url: Some("ftp://example.com".to_string()),
            ..options()
        });
        assert!(app.startup_error.is_some());
    }

    #[tokio::test]
    async fn test_views_from_polled_data() {
        let app = app_with_samples().await;

        let stats = app.fleet_stats().unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.with_data, 3);

        let markers = app.map_markers();
        assert_eq!(markers.len(), 3);
        let view = app.map_view(&markers);
        assert!(view.zoom >= 1);

        assert_eq!(app.current_day().as_deref(), Some("Today"));
        assert_eq!(app.days(), vec!["Today".to_string(), "Monday".to_string()]);
        assert_eq!(app.filtered_trends().len(), 2);
    }

    #[tokio::test]
    async fn test_selection_wraps_per_tab() {
        let mut app = app_with_samples().await;

        app.active_tab = Tab::Devices;
        app.select_previous();
        assert_eq!(app.selected_device, 3);

        app.active_tab = Tab::Map;
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_marker, 0);
        assert_eq!(app.selected_marker().unwrap().device_uid, "SAT-0001");
    }

    #[tokio::test]
    async fn test_search_filters_trends() {
        let mut app = app_with_samples().await;
        app.start_search();
        assert_eq!(app.active_tab, Tab::Trends);
        for c in "plant".chars() {
            app.search_push(c);
        }
        app.finish_search();
        let trends = app.filtered_trends();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].name, "Industrial Plant");

        app.cancel_search();
        assert_eq!(app.filtered_trends().len(), 2);
    }

    #[tokio::test]
    async fn test_tick_records_average_history() {
        let mut app = app_with_samples().await;
        app.tick();
        app.tick();
        // One completed cycle, one entry.
        assert_eq!(app.average_history.len(), 1);
        assert_eq!(app.average_history[0], 908);
    }

    #[tokio::test]
    async fn test_map_loader_constructs_once_surface_is_usable() {
        let mut app = app_with_samples().await;
        app.active_tab = Tab::Map;

        app.set_map_surface(Some(Surface::new(0, 0)));
        app.tick();
        assert!(!app.map_loader.state().is_ready());

        app.set_map_surface(Some(Surface::new(80, 20)));
        app.tick();
        assert!(app.map_loader.state().is_ready());
    }

    #[tokio::test]
    async fn test_map_loader_gives_up_without_surface() {
        let mut app = app_with_samples().await;
        app.active_tab = Tab::Map;
        for _ in 0..DEFAULT_MAX_FRAMES {
            app.tick();
        }
        assert!(app.map_loader.state().error().is_some());

        // Refresh on the map tab retries.
        app.refresh();
        assert!(app.map_loader.state().error().is_none());
    }

    #[test]
    fn test_zoom_offset_is_bounded() {
        let mut app = App::new(options());
        for _ in 0..30 {
            app.zoom_in();
        }
        assert_eq!(app.map_zoom_offset, MAX_ZOOM_OFFSET);
        for _ in 0..30 {
            app.zoom_out();
        }
        assert_eq!(app.map_zoom_offset, -MAX_ZOOM_OFFSET);
    }
}
