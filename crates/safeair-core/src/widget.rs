//! Load-state machine for the map widget.
//!
//! The widget library loads asynchronously and the widget may only be built
//! once its render surface is attached with a non-zero size. [`WidgetLoader`]
//! tracks that choreography:
//!
//! ```text
//! Unloaded --start--> Loading --library_loaded + frame(surface)--> Construct
//!     |                  |                                            |
//!     |                  +--library_failed / frame budget spent--> Failed
//!     +--start(no key)--> Failed                     construct_ok --> Ready
//! ```
//!
//! Construction is handed out at most once per loader.

use tracing::{debug, warn};

/// Shown when the surface never became ready.
pub const MAP_NOT_READY: &str = "Map container not ready. Please refresh the page.";

/// Shown when the widget library rejected the configuration.
pub const MAP_INIT_FAILED: &str = "Map failed to initialize. Check your API key.";

/// Shown when the provider rejected the key for this client.
pub const REFERER_NOT_ALLOWED: &str =
    "Maps API key: add this client to the key's allowed referrers in Google Cloud Console.";

/// Frames to wait for the surface before giving up.
pub const DEFAULT_MAX_FRAMES: u32 = 10;

/// Loading state of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    /// Failure reason, if failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Size of the render surface, when attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub width: u16,
    pub height: u16,
}

impl Surface {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// What the caller should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// Nothing to do this frame.
    Idle,
    /// Surface not ready yet; call [`WidgetLoader::frame`] again next frame.
    Wait,
    /// Build the widget now, then report with `construct_succeeded` or `construct_failed`.
    Construct,
}

/// Drives a widget from `Unloaded` to `Ready` or `Failed`.
#[derive(Debug, Clone)]
pub struct WidgetLoader {
    state: LoadState,
    library_loaded: bool,
    constructed: bool,
    frames_waited: u32,
    max_frames: u32,
}

impl Default for WidgetLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAMES)
    }
}

impl WidgetLoader {
    /// Create a loader that waits at most `max_frames` for the surface.
    pub fn new(max_frames: u32) -> Self {
        Self {
            state: LoadState::Unloaded,
            library_loaded: false,
            constructed: false,
            frames_waited: 0,
            max_frames: max_frames.max(1),
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Begin loading. Returns `false` if loading already started.
    ///
    /// `missing_config` fails the widget immediately with that message.
    pub fn start(&mut self, missing_config: Option<&str>) -> bool {
        if self.state != LoadState::Unloaded {
            return false;
        }
        match missing_config {
            Some(reason) => self.fail(reason.to_string()),
            None => {
                debug!("Widget loading");
                self.state = LoadState::Loading;
            }
        }
        true
    }

    /// The widget library finished loading.
    pub fn library_loaded(&mut self) {
        if self.state == LoadState::Loading {
            self.library_loaded = true;
        }
    }

    /// The widget library failed to load.
    pub fn library_failed(&mut self, reason: &str) {
        if self.state == LoadState::Loading {
            self.fail(remediation_for(reason).to_string());
        }
    }

    /// Advance one frame with the current surface.
    pub fn frame(&mut self, surface: Option<Surface>) -> FrameAction {
        if self.state != LoadState::Loading || !self.library_loaded || self.constructed {
            return FrameAction::Idle;
        }
        if surface.is_some_and(|s| s.is_usable()) {
            self.constructed = true;
            return FrameAction::Construct;
        }
        self.frames_waited += 1;
        if self.frames_waited >= self.max_frames {
            self.fail(MAP_NOT_READY.to_string());
            FrameAction::Idle
        } else {
            FrameAction::Wait
        }
    }

    /// The widget was built.
    pub fn construct_succeeded(&mut self) {
        if self.state == LoadState::Loading && self.constructed {
            debug!("Widget ready");
            self.state = LoadState::Ready;
        }
    }

    /// Building the widget failed.
    pub fn construct_failed(&mut self, reason: &str) {
        if self.state == LoadState::Loading && self.constructed {
            self.fail(remediation_for(reason).to_string());
        }
    }

    /// Return to `Unloaded` so loading can be retried.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_frames);
    }

    fn fail(&mut self, reason: String) {
        warn!(%reason, "Widget failed to load");
        self.state = LoadState::Failed(reason);
    }
}

/// User-facing message for a raw widget or provider error.
#[must_use]
pub fn remediation_for(error: &str) -> &'static str {
    if error.contains("RefererNotAllowed") || error.contains("referer") {
        REFERER_NOT_ALLOWED
    } else {
        MAP_INIT_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut loader = WidgetLoader::default();
        assert_eq!(loader.state(), &LoadState::Unloaded);
        assert!(loader.start(None));
        assert_eq!(loader.state(), &LoadState::Loading);

        // Nothing happens until the library is loaded.
        assert_eq!(loader.frame(Some(Surface::new(80, 24))), FrameAction::Idle);

        loader.library_loaded();
        assert_eq!(loader.frame(Some(Surface::new(80, 24))), FrameAction::Construct);
        loader.construct_succeeded();
        assert!(loader.state().is_ready());
    }

    #[test]
    fn test_constructs_only_once() {
        let mut loader = WidgetLoader::default();
        loader.start(None);
        loader.library_loaded();
        assert_eq!(loader.frame(Some(Surface::new(10, 10))), FrameAction::Construct);
        assert_eq!(loader.frame(Some(Surface::new(10, 10))), FrameAction::Idle);
        loader.construct_succeeded();
        assert_eq!(loader.frame(Some(Surface::new(10, 10))), FrameAction::Idle);
        assert!(!loader.start(None));
    }

    #[test]
    fn test_waits_for_surface_then_gives_up() {
        let mut loader = WidgetLoader::new(3);
        loader.start(None);
        loader.library_loaded();
        assert_eq!(loader.frame(None), FrameAction::Wait);
        assert_eq!(loader.frame(Some(Surface::new(0, 24))), FrameAction::Wait);
        assert_eq!(loader.frame(None), FrameAction::Idle);
        assert_eq!(loader.state().error(), Some(MAP_NOT_READY));
        assert_eq!(loader.frame(Some(Surface::new(80, 24))), FrameAction::Idle);
    }

    #[test]
    fn test_surface_arriving_within_budget() {
        let mut loader = WidgetLoader::new(3);
        loader.start(None);
        loader.library_loaded();
        assert_eq!(loader.frame(None), FrameAction::Wait);
        assert_eq!(loader.frame(Some(Surface::new(40, 12))), FrameAction::Construct);
    }

    #[test]
    fn test_missing_config_fails_immediately() {
        let mut loader = WidgetLoader::default();
        assert!(loader.start(Some("Please set SAFEAIR_MAPS_API_KEY")));
        assert_eq!(
            loader.state().error(),
            Some("Please set SAFEAIR_MAPS_API_KEY")
        );
    }

    #[test]
    fn test_failures_get_remediation() {
        let mut loader = WidgetLoader::default();
        loader.start(None);
        loader.library_failed("RefererNotAllowedMapError");
        assert_eq!(loader.state().error(), Some(REFERER_NOT_ALLOWED));

        let mut loader = WidgetLoader::default();
        loader.start(None);
        loader.library_loaded();
        loader.frame(Some(Surface::new(5, 5)));
        loader.construct_failed("InvalidKeyMapError");
        assert_eq!(loader.state().error(), Some(MAP_INIT_FAILED));
    }

    #[test]
    fn test_reset_allows_retry() {
        let mut loader = WidgetLoader::new(1);
        loader.start(None);
        loader.library_loaded();
        loader.frame(None);
        assert!(loader.state().error().is_some());
        loader.reset();
        assert_eq!(loader.state(), &LoadState::Unloaded);
        assert!(loader.start(None));
    }
}
