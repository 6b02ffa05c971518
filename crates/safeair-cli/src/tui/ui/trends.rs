//! Trends tab: day selector, location search, and hourly bars.

use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use safeair_core::trend::{max_ppm, peak_point, peak_severity};
use safeair_core::{BarScale, Thresholds};
use safeair_types::DeviceTrend;

use super::colors::{ppm_color, severity_color};
use super::poll_notice;
use super::theme::AppTheme;
use crate::tui::app::App;

/// Block characters from one eighth to a full cell.
const EIGHTHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub(super) fn draw_trends(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let [controls, notice_area, body] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(area);

    draw_controls(frame, controls, app, theme);
    if let Some(line) = app.trends.with_state(|s| poll_notice(s, theme)) {
        frame.render_widget(Paragraph::new(line), notice_area);
    }

    let locations = app.filtered_trends();
    let [list_area, chart_area] =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(body);

    draw_location_list(frame, list_area, app, &locations, theme);
    match locations.get(app.selected_location) {
        Some(location) => draw_hourly_chart(frame, chart_area, location, &app.thresholds, theme),
        None => {
            let message = if app.search.is_empty() {
                "No trend data"
            } else {
                "No locations match."
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, theme.dim_style()))
                    .block(theme.panel("Hourly CO₂", false)),
                chart_area,
            );
        }
    }
}

fn draw_controls(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let day = app.current_day().unwrap_or_else(|| "-".to_string());
    let mut spans = vec![
        Span::styled(" Day: ", theme.dim_style()),
        Span::styled("◀ ", Style::default().fg(theme.muted)),
        Span::styled(day, theme.title_style()),
        Span::styled(" ▶", Style::default().fg(theme.muted)),
        Span::styled("   Search: ", theme.dim_style()),
    ];
    if app.editing_search {
        spans.push(Span::styled(
            format!("{}_", app.search),
            Style::default().fg(theme.accent),
        ));
    } else if app.search.is_empty() {
        spans.push(Span::styled("(press /)", Style::default().fg(theme.muted)));
    } else {
        spans.push(Span::styled(app.search.clone(), Style::default().fg(theme.text)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_location_list(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    locations: &[DeviceTrend],
    theme: &AppTheme,
) {
    let fleet_max = locations
        .iter()
        .map(|l| max_ppm(&l.hourly_ppm_data))
        .fold(0.0, f64::max);

    let items: Vec<ListItem> = locations
        .iter()
        .map(|location| {
            let peak = max_ppm(&location.hourly_ppm_data);
            let severity = peak_severity(location, &app.thresholds);
            let color = severity_color(severity);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        mini_bar(peak, fleet_max).to_string(),
                        Style::default().fg(color),
                    ),
                    Span::raw(" "),
                    Span::styled(location.name.clone(), Style::default().fg(theme.text)),
                ]),
                Line::from(Span::styled(
                    format!("  {}  peak {:.0} ppm", location.device_uid, peak),
                    theme.dim_style(),
                )),
            ])
        })
        .collect();

    let title = format!("Locations ({})", locations.len());
    let list = List::new(items)
        .block(theme.panel(title, true))
        .highlight_style(theme.selected_style());
    let mut state = ListState::default();
    if !locations.is_empty() {
        state.select(Some(app.selected_location));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// One-cell bar for a location's peak relative to the fleet maximum.
fn mini_bar(value: f64, max: f64) -> char {
    let rows = BarScale::DEVICE_GRID.rows(value, max, EIGHTHS.len() as u16);
    EIGHTHS[usize::from(rows.clamp(1, EIGHTHS.len() as u16)) - 1]
}

fn draw_hourly_chart(
    frame: &mut Frame,
    area: Rect,
    location: &DeviceTrend,
    thresholds: &Thresholds,
    theme: &AppTheme,
) {
    let title = format!("{} ({})", location.name, location.device_uid);
    let block = theme.panel(title, false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let points = &location.hourly_ppm_data;
    if points.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No hourly data", theme.dim_style())),
            inner,
        );
        return;
    }

    // Bars, a time axis and a peak line.
    let chart_height = inner.height.saturating_sub(2).max(1);
    let max = max_ppm(points);
    let column_width = (inner.width as usize / points.len()).clamp(3, 6);
    let bar_width = column_width - 1;

    let heights: Vec<u16> = points
        .iter()
        .map(|p| BarScale::TREND_PANEL.rows(p.ppm_value, max, chart_height))
        .collect();

    let mut lines: Vec<Line> = (0..chart_height)
        .map(|row| {
            let level = chart_height - row;
            let spans: Vec<Span> = points
                .iter()
                .zip(&heights)
                .map(|(point, height)| {
                    let cell = if *height >= level {
                        "█".repeat(bar_width)
                    } else {
                        " ".repeat(bar_width)
                    };
                    Span::styled(
                        format!("{} ", cell),
                        Style::default().fg(ppm_color(Some(point.ppm_value), thresholds)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let axis: String = points
        .iter()
        .map(|p| {
            let label: String = p.time.chars().take(bar_width).collect();
            format!("{:<width$}", label, width = column_width)
        })
        .collect();
    lines.push(Line::from(Span::styled(axis, theme.dim_style())));

    if let Some(peak) = peak_point(points) {
        lines.push(Line::from(vec![
            Span::styled("Peak ", theme.dim_style()),
            Span::styled(
                format!("{:.0} ppm", peak.ppm_value),
                Style::default()
                    .fg(ppm_color(Some(peak.ppm_value), thresholds))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" at {}", peak.time), theme.dim_style()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
