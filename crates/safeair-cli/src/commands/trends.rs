//! Trends command implementation.

use std::path::PathBuf;

use anyhow::Result;
use safeair_core::{ApiClient, Thresholds, TrendQuery};
use time::Date;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_trends_csv, format_trends_json, format_trends_text, select_trends,
};
use crate::util::{with_spinner, write_output};

/// Arguments for the trends command.
pub struct TrendsArgs<'a> {
    pub day: Option<String>,
    pub start: Option<Date>,
    pub end: Option<Date>,
    pub search: Option<&'a str>,
    pub thresholds: &'a Thresholds,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_trends(client: &ApiClient, args: TrendsArgs<'_>) -> Result<()> {
    let query = build_query(args.day, args.start, args.end);
    tracing::debug!(%query, "Requesting trends");

    let response = with_spinner("trends", args.quiet, client.device_trends(&query)).await?;
    let devices = select_trends(&response, args.search);

    let content = match args.format {
        OutputFormat::Json => format_trends_json(&response, &devices, args.opts)?,
        OutputFormat::Csv => format_trends_csv(&devices, args.opts),
        OutputFormat::Text => format_trends_text(&response, &devices, args.thresholds, args.opts),
    };

    write_output(args.output, &content)?;
    Ok(())
}

/// A named day wins; a range needs both bounds; otherwise the backend default.
fn build_query(day: Option<String>, start: Option<Date>, end: Option<Date>) -> TrendQuery {
    match day.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) {
        Some(day) => TrendQuery::day(day),
        None => TrendQuery::range(start, end).unwrap_or_default(),
    }
}
