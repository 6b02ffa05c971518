//! Map command implementation.

use std::path::PathBuf;

use anyhow::Result;
use safeair_core::map::markers;
use safeair_core::{
    ApiClient, DEFAULT_TIMEOUT, MapMarker, MapView, StaticMap, Thresholds, http_client,
};
use time::OffsetDateTime;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, MapOutput, format_map_csv, format_map_json, format_map_text};
use crate::style;
use crate::util::{with_spinner, write_output};

/// Arguments for the map command.
pub struct MapArgs<'a> {
    pub api_key: Option<String>,
    pub zoom: Option<u8>,
    pub size: (u32, u32),
    pub check: bool,
    pub thresholds: &'a Thresholds,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_map(client: &ApiClient, args: MapArgs<'_>) -> Result<()> {
    let devices = with_spinner("devices", args.quiet, client.device_summaries()).await?;
    let markers = markers(&devices, args.thresholds);
    let view = map_view(&markers, args.zoom);

    let static_map = StaticMap::new(view, &markers).size(args.size.0, args.size.1);
    let (mut static_map_url, mut map_error) = match static_map.url(args.api_key.as_deref()) {
        Ok(url) => (Some(url.to_string()), None),
        Err(e) => (None, Some(e.to_string())),
    };

    if args.check && static_map_url.is_some() {
        let http = http_client(DEFAULT_TIMEOUT)?;
        let sp = (!args.quiet).then(|| style::operation_spinner("Checking map provider..."));
        let result = static_map.verify(&http, args.api_key.as_deref()).await;
        if let Some(sp) = sp {
            sp.finish_and_clear();
        }
        if let Err(e) = result {
            tracing::warn!("Static map check failed: {}", e);
            static_map_url = None;
            map_error = Some(e.to_string());
        }
    }

    let map = MapOutput {
        view,
        markers: &markers,
        static_map_url,
        map_error,
    };
    let content = match args.format {
        OutputFormat::Json => format_map_json(&map, args.opts)?,
        OutputFormat::Csv => format_map_csv(&markers, args.opts),
        OutputFormat::Text => format_map_text(&map, OffsetDateTime::now_utc(), args.opts),
    };

    write_output(args.output, &content)?;
    Ok(())
}

/// Fit the markers, then apply an explicit zoom.
fn map_view(markers: &[MapMarker], zoom: Option<u8>) -> MapView {
    let fitted = MapView::fit(markers);
    match zoom {
        Some(zoom) => MapView { zoom, ..fitted },
        None => fitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeair_core::map::DEFAULT_CENTER;
    use safeair_core::mock::sample_devices;

    #[test]
    fn test_map_view_without_markers() {
        let view = map_view(&[], None);
        assert_eq!(view.center, DEFAULT_CENTER);
        assert_eq!(view.zoom, 10);
    }

    #[test]
    fn test_map_view_zoom_override() {
        let markers = markers(&sample_devices(), &Thresholds::default());
        let fitted = map_view(&markers, None);
        let zoomed = map_view(&markers, Some(4));
        assert_eq!(zoomed.zoom, 4);
        assert_eq!(zoomed.center, fitted.center);
    }
}
