//! Live tab: stat cards, average sparkline and the live device list.

use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph, Sparkline};
use safeair_core::display::{format_ppm, relative_time};
use safeair_types::DeviceSummary;
use time::OffsetDateTime;

use super::colors::{ppm_color, severity_badge, severity_color};
use super::poll_notice;
use super::theme::AppTheme;
use crate::tui::app::App;

pub(super) fn draw_live(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let notice = app.summaries.with_state(|s| poll_notice(s, theme));
    let notice_height = u16::from(notice.is_some());

    let [notice_area, cards, chart, list] = Layout::vertical([
        Constraint::Length(notice_height),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Min(3),
    ])
    .areas(area);

    if let Some(line) = notice {
        frame.render_widget(Paragraph::new(line), notice_area);
    }
    draw_stat_cards(frame, cards, app, theme);
    draw_average_chart(frame, chart, app, theme);
    draw_live_list(frame, list, app, theme);
}

fn draw_stat_cards(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let stats = app.fleet_stats();

    let cards: [(&str, String, Color); 5] = match &stats {
        Some(s) => [
            ("Devices", s.total.to_string(), theme.text),
            ("With data", s.with_data.to_string(), theme.text),
            ("Average", format_ppm(s.average), ppm_color(s.average, &app.thresholds)),
            ("Max", format_ppm(s.max), ppm_color(s.max, &app.thresholds)),
            (
                "High",
                s.exceeding.to_string(),
                if s.exceeding > 0 { theme.error } else { theme.ok },
            ),
        ],
        None => [
            ("Devices", "-".to_string(), theme.muted),
            ("With data", "-".to_string(), theme.muted),
            ("Average", "-".to_string(), theme.muted),
            ("Max", "-".to_string(), theme.muted),
            ("High", "-".to_string(), theme.muted),
        ],
    };

    let areas = Layout::horizontal([Constraint::Ratio(1, 5); 5]).split(area);
    for ((title, text, color), card) in cards.into_iter().zip(areas.iter()) {
        let unit = if matches!(title, "Average" | "Max") && text != "-" {
            " ppm"
        } else {
            ""
        };
        let body = Paragraph::new(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(unit, theme.dim_style()),
            ]),
        ])
        .alignment(Alignment::Center)
        .block(theme.panel(title, false));
        frame.render_widget(body, *card);
    }
}

fn draw_average_chart(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let data: Vec<u64> = app.average_history.iter().copied().collect();
    let color = data
        .last()
        .map(|v| ppm_color(Some(*v as f64), &app.thresholds))
        .unwrap_or(theme.muted);
    let block = theme.panel("Fleet average", false);

    if data.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("Waiting for data", theme.dim_style())).block(block),
            area,
        );
        return;
    }

    // Show the most recent readings that fit.
    let width = area.width.saturating_sub(2) as usize;
    let start = data.len().saturating_sub(width);
    let sparkline = Sparkline::default()
        .block(block)
        .data(&data[start..])
        .style(Style::default().fg(color));
    frame.render_widget(sparkline, area);
}

fn draw_live_list(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let mut devices = app.devices();
    sort_by_reading(&mut devices);
    let now = OffsetDateTime::now_utc();

    let items: Vec<ListItem> = devices
        .iter()
        .map(|device| {
            let severity = app.thresholds.classify(device.latest_co2);
            let color = severity_color(severity);
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<12}", device.device_uid), Style::default().fg(theme.text)),
                Span::styled(
                    format!("{:>6} ppm  ", format_ppm(device.latest_co2)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{:<9}", severity_badge(severity)), Style::default().fg(color)),
                Span::styled(
                    relative_time(device.latest_recorded_at.as_deref(), now),
                    theme.dim_style(),
                ),
            ]))
        })
        .collect();

    let title = format!("Live devices ({})", devices.len());
    frame.render_widget(List::new(items).block(theme.panel(title, true)), area);
}

/// Highest reading first; devices without data last.
fn sort_by_reading(devices: &mut [DeviceSummary]) {
    devices.sort_by(|a, b| {
        let a = a.latest_co2.filter(|v| !v.is_nan());
        let b = b.latest_co2.filter(|v| !v.is_nan());
        match (a, b) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}
