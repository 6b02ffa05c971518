//! Stats command implementation.

use std::path::PathBuf;

use anyhow::Result;
use safeair_core::{ApiClient, FleetStats, Thresholds};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_stats_csv, format_stats_json, format_stats_text};
use crate::util::{with_spinner, write_output};

pub async fn cmd_stats(
    client: &ApiClient,
    thresholds: &Thresholds,
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let devices = with_spinner("devices", quiet, client.device_summaries()).await?;
    let stats = FleetStats::compute(&devices, thresholds);
    tracing::debug!(total = stats.total, with_data = stats.with_data, "Computed fleet stats");

    let content = match format {
        OutputFormat::Json => format_stats_json(&stats, thresholds, opts)?,
        OutputFormat::Csv => format_stats_csv(&stats, opts),
        OutputFormat::Text => format_stats_text(&stats, thresholds, opts),
    };

    write_output(output, &content)?;
    Ok(())
}
