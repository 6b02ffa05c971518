use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;
mod style;
mod util;

use cli::{Cli, Commands};
use commands::{LiveArgs, MapArgs, TrendsArgs};
use config::{Config, resolve_interval, resolve_maps_api_key};
use format::FormatOptions;
use util::require_client;

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "safeair", &mut io::stdout());
        return Ok(());
    }

    init_tracing(&cli)?;

    let config = Config::load();
    let no_color = cli.no_color || config.no_color;
    let base_opts = FormatOptions::new(no_color, cli.style).with_compact(cli.compact);
    let output = cli.output.as_ref();
    let quiet = cli.quiet;
    let json = cli.json;
    let config_format = config.format.as_deref();

    match cli.command {
        Commands::Devices {
            backend,
            output: out,
            search,
        } => {
            let client = require_client(backend.base_url, &config)?;
            let thresholds = config.thresholds()?;
            let format = out.resolve_format(json, config_format);
            let opts = base_opts.with_no_header(out.no_header);
            commands::cmd_devices(
                &client,
                search.as_deref(),
                &thresholds,
                format,
                output,
                quiet,
                &opts,
            )
            .await?;
        }
        Commands::Stats {
            backend,
            output: out,
        } => {
            let client = require_client(backend.base_url, &config)?;
            let thresholds = config.thresholds()?;
            let format = out.resolve_format(json, config_format);
            let opts = base_opts.with_no_header(out.no_header);
            commands::cmd_stats(&client, &thresholds, format, output, quiet, &opts).await?;
        }
        Commands::Live {
            backend,
            output: out,
            interval,
            count,
        } => {
            let client = require_client(backend.base_url, &config)?;
            let thresholds = config.thresholds()?;
            let format = out.resolve_format(json, config_format);
            let opts = base_opts.with_no_header(out.no_header);
            commands::cmd_live(LiveArgs {
                client,
                interval: resolve_interval(interval, &config),
                count,
                thresholds,
                format,
                output,
                quiet,
                opts: &opts,
            })
            .await?;
        }
        Commands::Trends {
            backend,
            output: out,
            day,
            start,
            end,
            search,
        } => {
            let client = require_client(backend.base_url, &config)?;
            let thresholds = config.thresholds()?;
            let format = out.resolve_format(json, config_format);
            let opts = base_opts.with_no_header(out.no_header);
            commands::cmd_trends(
                &client,
                TrendsArgs {
                    day,
                    start,
                    end,
                    search: search.as_deref(),
                    thresholds: &thresholds,
                    format,
                    output,
                    quiet,
                    opts: &opts,
                },
            )
            .await?;
        }
        Commands::Register {
            backend,
            device,
            no_input,
        } => {
            let client = require_client(backend.base_url, &config)?;
            commands::cmd_register(&client, device, no_input, json, output, quiet, &base_opts)
                .await?;
        }
        Commands::Map {
            backend,
            output: out,
            api_key,
            zoom,
            size,
            check,
        } => {
            let client = require_client(backend.base_url, &config)?;
            let thresholds = config.thresholds()?;
            let format = out.resolve_format(json, config_format);
            let opts = base_opts.with_no_header(out.no_header);
            commands::cmd_map(
                &client,
                MapArgs {
                    api_key: resolve_maps_api_key(api_key, &config),
                    zoom,
                    size,
                    check,
                    thresholds: &thresholds,
                    format,
                    output,
                    quiet,
                    opts: &opts,
                },
            )
            .await?;
        }
        Commands::Config { action } => {
            commands::cmd_config(action, &Config::path(), quiet)?;
        }
        #[cfg(feature = "tui")]
        Commands::Tui {
            backend,
            api_key,
            interval,
        } => {
            let thresholds = config.thresholds()?;
            let options = safeair_cli::tui::TuiOptions {
                base_url: config::resolve_base_url(backend.base_url, &config),
                maps_api_key: resolve_maps_api_key(api_key, &config),
                thresholds,
                poll_interval: resolve_interval(interval, &config),
            };
            safeair_cli::tui::run(options).await?;
        }
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }

    Ok(())
}

/// Install the tracing subscriber.
///
/// The dashboard owns the terminal, so its logs go to a file instead.
fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    #[cfg(feature = "tui")]
    if matches!(cli.command, Commands::Tui { .. }) {
        use anyhow::Context;

        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("safeair");
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
        let log_path = log_dir.join("tui.log");
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}
