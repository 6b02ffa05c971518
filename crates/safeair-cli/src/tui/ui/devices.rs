//! Devices tab: every device with its latest reading and location.

use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use safeair_core::display::{format_coordinate, format_ppm, relative_time};
use time::OffsetDateTime;

use super::colors::{severity_badge, severity_color};
use super::poll_notice;
use super::theme::AppTheme;
use crate::tui::app::App;

pub(super) fn draw_devices(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let notice = app.summaries.with_state(|s| poll_notice(s, theme));
    let [notice_area, table_area] = Layout::vertical([
        Constraint::Length(u16::from(notice.is_some())),
        Constraint::Min(3),
    ])
    .areas(area);
    if let Some(line) = notice {
        frame.render_widget(Paragraph::new(line), notice_area);
    }

    let devices = app.devices();
    let now = OffsetDateTime::now_utc();
    let with_data = devices.iter().filter(|d| d.latest_co2.is_some()).count();

    let header = Row::new(["Device", "CO₂ (ppm)", "Status", "Latitude", "Longitude", "Updated"])
        .style(theme.title_style())
        .bottom_margin(1);

    let rows: Vec<Row> = devices
        .iter()
        .map(|device| {
            let severity = app.thresholds.classify(device.latest_co2);
            let color = severity_color(severity);
            let text_style = if device.latest_co2.is_some() {
                Style::default().fg(theme.text)
            } else {
                theme.dim_style()
            };
            let (lat, lng) = match device.location {
                Some(loc) => (Some(loc.latitude), Some(loc.longitude)),
                None => (None, None),
            };
            Row::new([
                Cell::from(device.device_uid.clone()).style(text_style),
                Cell::from(format_ppm(device.latest_co2))
                    .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Cell::from(severity_badge(severity)).style(Style::default().fg(color)),
                Cell::from(format_coordinate(lat)).style(text_style),
                Cell::from(format_coordinate(lng)).style(text_style),
                Cell::from(relative_time(device.latest_recorded_at.as_deref(), now))
                    .style(theme.dim_style()),
            ])
        })
        .collect();

    let title = format!(
        "Devices ({} with data, {} without)",
        with_data,
        devices.len() - with_data
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(theme.panel(title, true))
    .row_highlight_style(theme.selected_style())
    .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !devices.is_empty() {
        state.select(Some(app.selected_device));
    }
    frame.render_stateful_widget(table, table_area, &mut state);
}
