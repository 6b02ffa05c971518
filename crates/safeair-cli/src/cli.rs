//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use safeair_core::TrendQuery;
use safeair_types::OwnerType;
use time::Date;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse a format name as stored in the config file.
    pub fn from_config(value: &str) -> Option<Self> {
        Self::from_str(value, true).ok()
    }
}

/// Visual styling mode for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleMode {
    /// Standard styling with colors
    Minimal,
    /// Rich styling with tables and full formatting (default)
    #[default]
    Rich,
    /// Plain text with no decorations (for scripting)
    Plain,
}

/// Where to find the backend
#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// Backend base URL, e.g. http://localhost:8080
    #[arg(short = 'u', long, env = "SAFEAIR_LIVE_URL")]
    pub base_url: Option<String>,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format (defaults to the configured format, then text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Omit header row in CSV output (useful for appending)
    #[arg(long)]
    pub no_header: bool,
}

impl OutputArgs {
    /// Resolve the format: `--json`, then `--format`, then config, then text.
    pub fn resolve_format(&self, json: bool, config_format: Option<&str>) -> OutputFormat {
        if json {
            OutputFormat::Json
        } else if let Some(format) = self.format {
            format
        } else {
            config_format
                .and_then(OutputFormat::from_config)
                .unwrap_or_default()
        }
    }
}

#[derive(Parser)]
#[command(name = "safeair")]
#[command(author, version, about = "CLI and dashboard for SafeAir CO2 monitors", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Visual styling mode (minimal, rich, plain)
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "rich",
        env = "SAFEAIR_STYLE"
    )]
    pub style: StyleMode,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered devices with their latest reading
    Devices {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Only list devices whose UID contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Fleet statistics across all devices
    Stats {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Continuously poll the backend and print fleet status
    Live {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Polling interval in seconds (defaults to config, then 3)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Number of poll cycles before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u64,
    },

    /// Hourly CO2 trends per location
    Trends {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Day to show, as offered by the backend (e.g. Today, Monday)
        #[arg(short, long, conflicts_with_all = ["start", "end"])]
        day: Option<String>,

        /// First day of a date range (YYYY-MM-DD)
        #[arg(long, requires = "end", value_parser = parse_date)]
        start: Option<Date>,

        /// Last day of a date range (YYYY-MM-DD)
        #[arg(long, requires = "start", value_parser = parse_date)]
        end: Option<Date>,

        /// Filter locations by name, UID or id
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Register a new device with the backend
    Register {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        device: RegisterArgs,

        /// Fail instead of prompting for missing fields
        #[arg(long)]
        no_input: bool,
    },

    /// Device locations on a map
    Map {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Map provider API key
        #[arg(long, env = "SAFEAIR_MAPS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Override the fitted zoom level (1-18)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=18))]
        zoom: Option<u8>,

        /// Static map image size in pixels
        #[arg(long, default_value = "640x400", value_parser = parse_size)]
        size: (u32, u32),

        /// Ask the map provider whether the image renders
        #[arg(long)]
        check: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Launch interactive terminal dashboard
    #[cfg(feature = "tui")]
    Tui {
        #[command(flatten)]
        backend: BackendArgs,

        /// Map provider API key
        #[arg(long, env = "SAFEAIR_MAPS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Polling interval in seconds (defaults to config, then 3)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
}

/// Fields of a registration request. Missing ones are prompted for.
#[derive(Debug, Clone, Default, Args)]
pub struct RegisterArgs {
    /// Device UID printed on the sensor
    #[arg(long)]
    pub uid: Option<String>,

    /// Owner type (company, individual, government, non-profit)
    #[arg(long, value_parser = parse_owner_type)]
    pub owner_type: Option<OwnerType>,

    /// Owner name
    #[arg(long)]
    pub owner_name: Option<String>,

    /// Owner contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Owner contact phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Installation latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Installation longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Phone model used for provisioning
    #[arg(long)]
    pub phone_model: Option<String>,
}

/// Parse a `YYYY-MM-DD` date argument.
fn parse_date(s: &str) -> Result<Date, String> {
    TrendQuery::parse_date(s).map_err(|e| e.to_string())
}

/// Parse an owner type argument.
fn parse_owner_type(s: &str) -> Result<OwnerType, String> {
    s.parse().map_err(|e: safeair_types::ValidationError| {
        format!("{}. Valid values: company, individual, government, non-profit", e)
    })
}

/// Parse a `WIDTHxHEIGHT` size argument.
fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Invalid size '{}'. Use WIDTHxHEIGHT, e.g. 640x400", s))?;
    let parse = |v: &str| -> Result<u32, String> {
        match v.trim().parse::<u32>() {
            Ok(n) if (1..=2048).contains(&n) => Ok(n),
            _ => Err(format!("Invalid size '{}'. Each side must be 1-2048 pixels", s)),
        }
    };
    Ok((parse(w)?, parse(h)?))
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Backend base URL
    BaseUrl,
    /// Map provider API key
    MapsApiKey,
    /// Default output format
    Format,
    /// Disable colored output
    NoColor,
    /// Polling interval in seconds
    PollInterval,
    /// Lower bound of the elevated band (ppm)
    ElevatedThreshold,
    /// Lower bound of the high band (ppm)
    HighThreshold,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Unset (remove) a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}
