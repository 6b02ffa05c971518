//! Map tab: device markers over a world map.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use ratatui::widgets::canvas::{Canvas, Map, MapResolution};
use safeair_core::LoadState;
use safeair_core::map::MISSING_KEY_MESSAGE;

use super::colors::severity_color;
use super::theme::AppTheme;
use crate::tui::app::App;

/// Rows below the canvas for the selected marker and map status.
const FOOTER_HEIGHT: u16 = 3;

fn split(content: Rect) -> [Rect; 2] {
    Layout::vertical([Constraint::Min(1), Constraint::Length(FOOTER_HEIGHT)]).areas(content)
}

/// Drawable area of the canvas inside its border.
pub(super) fn canvas_area(content: Rect) -> Rect {
    let [canvas, _] = split(content);
    canvas.inner(Margin::new(1, 1))
}

pub(super) fn draw_map(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let [canvas_rect, footer] = split(area);

    match app.map_loader.state() {
        LoadState::Ready => draw_canvas(frame, canvas_rect, app, theme),
        LoadState::Failed(reason) => {
            let lines = vec![
                Line::from(Span::styled(
                    reason.clone(),
                    Style::default().fg(theme.error),
                )),
                Line::from(""),
                Line::from(Span::styled("Press r to retry", theme.dim_style())),
            ];
            frame.render_widget(
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .block(theme.panel("Map", true)),
                canvas_rect,
            );
        }
        LoadState::Unloaded | LoadState::Loading => {
            frame.render_widget(
                Paragraph::new(Span::styled("Loading map...", theme.dim_style()))
                    .alignment(Alignment::Center)
                    .block(theme.panel("Map", true)),
                canvas_rect,
            );
        }
    }

    draw_footer(frame, footer, app, theme);
}

fn draw_canvas(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let markers = app.map_markers();
    let view = app.map_view(&markers);
    let (x_bounds, y_bounds) = view.bounds();
    let selected = app.selected_marker;
    let map_color = theme.muted;
    let label_color = theme.text;

    let canvas = Canvas::default()
        .block(theme.panel(format!("Map ({} devices)", markers.len()), true))
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: map_color,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for (index, marker) in markers.iter().enumerate() {
                let (x, y) = (marker.location.longitude, marker.location.latitude);
                let color = severity_color(marker.severity);
                if index == selected {
                    ctx.print(
                        x,
                        y,
                        Line::from(vec![
                            Span::styled(
                                "◉ ",
                                Style::default().fg(color).add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(
                                marker.device_uid.clone(),
                                Style::default()
                                    .fg(label_color)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        ]),
                    );
                } else {
                    ctx.print(x, y, Span::styled("●", Style::default().fg(color)));
                }
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let markers = app.map_markers();
    let view = app.map_view(&markers);

    let selection = match app.selected_marker() {
        Some(marker) => Line::from(vec![
            Span::styled(" ● ", Style::default().fg(severity_color(marker.severity))),
            Span::styled(marker.title(), theme.title_style()),
            Span::styled(
                format!("  ({}/{})", app.selected_marker + 1, markers.len()),
                theme.dim_style(),
            ),
        ]),
        None => Line::from(Span::styled(" No devices with a location", theme.dim_style())),
    };

    let view_line = Line::from(Span::styled(
        format!(
            " Zoom {}  Center {:.4}, {:.4}",
            view.zoom, view.center.latitude, view.center.longitude
        ),
        theme.dim_style(),
    ));

    let static_map = match app.maps_api_key {
        Some(_) => Line::from(Span::styled(
            " Static map: configured",
            Style::default().fg(theme.ok),
        )),
        None => Line::from(Span::styled(
            format!(" Static map: {}", MISSING_KEY_MESSAGE),
            Style::default().fg(theme.warning),
        )),
    };

    frame.render_widget(Paragraph::new(vec![selection, view_line, static_map]), area);
}
