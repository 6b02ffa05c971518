//! Command-line interface and terminal dashboard for SafeAir CO₂ monitors.
//!
//! The `safeair` binary reads a SafeAir backend and renders its device fleet
//! as tables, live status lines, hourly trend bars and a map.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `devices` | List devices with their latest reading |
//! | `stats` | Fleet statistics |
//! | `live` | Poll continuously and print one line per cycle |
//! | `trends` | Hourly CO₂ per location for a day or date range |
//! | `register` | Register a new device |
//! | `map` | Device markers, fitted viewport and static map URL |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//! | `tui` | Interactive terminal dashboard |
//!
//! # Output Formats
//!
//! - **Text** (default): Human-readable colored output
//! - **JSON**: Machine-readable JSON format
//! - **CSV**: Comma-separated values for spreadsheets and data analysis
//!
//! # Configuration
//!
//! Settings live in `~/.config/safeair/config.toml` (or platform equivalent):
//!
//! - `base_url`: Backend base URL
//! - `maps_api_key`: Map provider key for static map images
//! - `format`: Default output format
//! - `no_color`: Disable colored output
//! - `poll_interval_secs`: Polling interval for `live` and `tui`
//! - `elevated_threshold` / `high_threshold`: Severity cut-offs in ppm
//!
//! # Environment Variables
//!
//! - `SAFEAIR_LIVE_URL`: Backend base URL (overridden by `--base-url`)
//! - `LIVE_URL`: Fallback backend base URL
//! - `SAFEAIR_MAPS_API_KEY`: Map provider key
//! - `NO_COLOR`: Disable colored output when set
//!
//! # Examples
//!
//! ```bash
//! safeair devices --base-url http://localhost:8080
//! safeair trends --start 2025-01-01 --end 2025-01-07 --format csv
//! safeair live --interval 5 --count 10
//! ```

pub use safeair_core;
pub use safeair_types;

// TUI module - exposed so the dashboard can be embedded elsewhere
#[cfg(feature = "tui")]
pub mod tui;
