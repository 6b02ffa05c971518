//! Devices command implementation.

use std::path::PathBuf;

use anyhow::Result;
use safeair_core::{ApiClient, Thresholds};
use safeair_types::DeviceSummary;
use time::OffsetDateTime;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_devices_csv, format_devices_json, format_devices_text,
};
use crate::util::{with_spinner, write_output};

pub async fn cmd_devices(
    client: &ApiClient,
    search: Option<&str>,
    thresholds: &Thresholds,
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let devices = with_spinner("devices", quiet, client.device_summaries()).await?;
    let devices = filter_by_uid(devices, search);

    let content = match format {
        OutputFormat::Json => format_devices_json(&devices, thresholds, opts)?,
        OutputFormat::Csv => format_devices_csv(&devices, thresholds, opts),
        OutputFormat::Text => {
            format_devices_text(&devices, thresholds, OffsetDateTime::now_utc(), opts)
        }
    };

    write_output(output, &content)?;
    Ok(())
}

/// Keep devices whose UID contains `search`, ignoring case.
fn filter_by_uid(devices: Vec<DeviceSummary>, search: Option<&str>) -> Vec<DeviceSummary> {
    let Some(query) = search.map(str::trim).filter(|q| !q.is_empty()) else {
        return devices;
    };
    let query = query.to_lowercase();
    devices
        .into_iter()
        .filter(|d| d.device_uid.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeair_core::mock::sample_devices;

    #[test]
    fn test_filter_by_uid() {
        let filtered = filter_by_uid(sample_devices(), Some("sat-0002"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].device_uid, "SAT-0002");

        assert_eq!(filter_by_uid(sample_devices(), None).len(), 4);
        assert_eq!(filter_by_uid(sample_devices(), Some("  ")).len(), 4);
        assert!(filter_by_uid(sample_devices(), Some("nope")).is_empty());
    }
}
