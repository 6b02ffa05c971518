//! Live command implementation.
//!
//! Runs a summary poller and prints one line per completed poll cycle. A
//! failed cycle still prints, showing the error next to the last good data.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;
use safeair_core::{
    ApiClient, FleetStats, PollState, Poller, PollerOptions, SummarySource, Thresholds,
};
use safeair_types::DeviceSummary;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, LiveSnapshot, format_live_csv_header, format_live_csv_line, format_live_json,
    format_live_line,
};
use crate::util::append_output;

/// Error prefix for failed summary polls.
const LIVE_ERROR_CONTEXT: &str = "Unable to load live device data";

/// Arguments for the live command.
pub struct LiveArgs<'a> {
    pub client: ApiClient,
    pub interval: Duration,
    pub count: u64,
    pub thresholds: Thresholds,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_live(args: LiveArgs<'_>) -> Result<()> {
    let LiveArgs {
        client,
        interval,
        count,
        thresholds,
        format,
        output,
        quiet,
        opts,
    } = args;

    if !quiet {
        let target = if opts.no_color {
            client.base_url().to_string()
        } else {
            format!("{}", client.base_url().cyan())
        };
        eprintln!("Polling: {}", target);
        if count > 0 {
            eprintln!(
                "Interval: {}s | Count: {} | Press Ctrl+C to stop",
                interval.as_secs(),
                count
            );
        } else {
            eprintln!("Interval: {}s | Press Ctrl+C to stop", interval.as_secs());
        }
        eprintln!("{}", "-".repeat(50));
    }

    let options = PollerOptions::builder()
        .interval(interval)
        .error_context(LIVE_ERROR_CONTEXT)
        .build();
    let mut handle = Poller::spawn(SummarySource::new(client), options);

    let mut printer = LivePrinter::new(thresholds, format, opts);
    let mut seen_cycles = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                if !quiet {
                    eprintln!("\nShutting down...");
                }
                break;
            }
            changed = handle.changed() => {
                if !changed {
                    break;
                }
            }
        }

        let state = handle.state();
        // Loading flips publish too; only finished cycles are printed.
        if state.cycles == seen_cycles {
            continue;
        }
        seen_cycles = state.cycles;

        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        let content = printer.render(&state, &timestamp)?;
        append_output(output, &content)?;

        if count > 0 && seen_cycles >= count {
            if !quiet {
                eprintln!("Completed {} poll cycles.", seen_cycles);
            }
            break;
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Turns poll states into output, tracking what earlier lines showed.
struct LivePrinter<'a> {
    thresholds: Thresholds,
    format: OutputFormat,
    opts: &'a FormatOptions,
    previous_average: Option<f64>,
    header_written: bool,
}

impl<'a> LivePrinter<'a> {
    fn new(thresholds: Thresholds, format: OutputFormat, opts: &'a FormatOptions) -> Self {
        Self {
            thresholds,
            format,
            opts,
            previous_average: None,
            header_written: opts.no_header,
        }
    }

    fn render(&mut self, state: &PollState<Vec<DeviceSummary>>, timestamp: &str) -> Result<String> {
        let stats = state
            .data
            .as_ref()
            .map(|devices| FleetStats::compute(devices, &self.thresholds));
        let snapshot = LiveSnapshot {
            timestamp,
            stats: stats.as_ref(),
            previous_average: self.previous_average,
            error: state.error.as_deref(),
        };

        let content = match self.format {
            OutputFormat::Json => format_live_json(&snapshot)?,
            OutputFormat::Csv => {
                let mut out = String::new();
                if !self.header_written {
                    out.push_str(&format_live_csv_header());
                    self.header_written = true;
                }
                out.push_str(&format_live_csv_line(&snapshot));
                out
            }
            OutputFormat::Text => format_live_line(&snapshot, &self.thresholds, self.opts),
        };

        if let Some(average) = stats.and_then(|s| s.average) {
            self.previous_average = Some(average);
        }
        Ok(content)
    }
}
