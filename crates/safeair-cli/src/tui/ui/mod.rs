//! Layout and rendering for the TUI dashboard.
//!
//! - **Header**: title, fleet counts and poller state
//! - **Tab bar**: Live, Devices, Trends, Map
//! - **Main content**: the active tab
//! - **Status bar**: key hints or status message, and the clock

pub mod colors;
pub mod theme;

mod devices;
mod live;
mod map;
mod overlays;
mod trends;

use chrono::Local;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use safeair_core::{PollState, Surface};

use super::app::{App, Tab};
use colors::ppm_color;
use theme::{AppTheme, BORDER_TYPE};

/// Split the screen into header, tab bar, content and status bar.
fn main_layout(area: Rect) -> [Rect; 4] {
    Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(2), // Tab bar
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Status bar
    ])
    .areas(area)
}

/// Size the map canvas will have on a screen of `area`.
#[must_use]
pub fn map_surface(area: Rect) -> Option<Surface> {
    let [_, _, content, _] = main_layout(area);
    let canvas = map::canvas_area(content);
    Some(Surface::new(canvas.width, canvas.height))
}

/// Draw the complete TUI interface.
pub fn draw(frame: &mut Frame, app: &App) {
    let theme = app.app_theme();
    if let Some(bg) = theme.background {
        frame.render_widget(Block::default().style(Style::default().bg(bg)), frame.area());
    }

    let [header, tabs, content, status] = main_layout(frame.area());

    draw_header(frame, header, app, &theme);
    draw_tab_bar(frame, tabs, app, &theme);

    match app.active_tab {
        Tab::Live => live::draw_live(frame, content, app, &theme),
        Tab::Devices => devices::draw_devices(frame, content, app, &theme),
        Tab::Trends => trends::draw_trends(frame, content, app, &theme),
        Tab::Map => map::draw_map(frame, content, app, &theme),
    }

    draw_status_bar(frame, status, app, &theme);

    if app.show_popup && app.active_tab == Tab::Map {
        overlays::draw_marker_popup(frame, app, &theme);
    }
    if app.show_help {
        overlays::draw_help_overlay(frame, &theme);
    }
}

/// Draw the header bar with app title, fleet counts and poller state.
fn draw_header(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let mut spans = vec![
        Span::styled(
            " SafeAir ",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION"), " "),
            Style::default().fg(theme.muted),
        ),
    ];

    if let Some(stats) = app.fleet_stats() {
        spans.push(Span::styled(
            format!(" {}/{} reporting ", stats.with_data, stats.total),
            Style::default().fg(theme.text_dim),
        ));
        if let Some(average) = stats.average {
            spans.push(Span::styled(
                format!(" avg {:.0} ppm ", average),
                Style::default().fg(ppm_color(Some(average), &app.thresholds)),
            ));
        }
        if stats.exceeding > 0 {
            spans.push(Span::styled(
                format!(" !{} high ", stats.exceeding),
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            ));
        }
    }

    let (loading, stale, failed) = app
        .summaries
        .with_state(|s| (s.loading, s.is_stale(), s.data.is_none() && s.error.is_some()));
    if loading {
        spans.push(Span::styled(" SYNC ", Style::default().fg(theme.accent)));
    }
    if stale {
        spans.push(Span::styled(" STALE ", Style::default().fg(theme.warning)));
    }
    if failed {
        spans.push(Span::styled(" ERR ", Style::default().fg(theme.error)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(theme.header_style()),
        area,
    );
}

/// Draw the tab bar, underlining the active tab.
fn draw_tab_bar(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let name = format!(" {} {} ", i + 1, tab.title());
            if *tab == app.active_tab {
                Line::from(Span::styled(
                    name,
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                ))
            } else {
                Line::from(Span::styled(name, Style::default().fg(theme.muted)))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BORDER_TYPE)
                .border_style(Style::default().fg(theme.border)),
        )
        .divider(Span::styled("|", Style::default().fg(theme.muted)))
        .select(app.active_tab.index());

    frame.render_widget(tabs, area);
}

/// Context-sensitive key hints.
fn context_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    if app.editing_search {
        return vec![("Enter", "apply"), ("Esc", "clear")];
    }
    let mut hints = vec![("?", "help"), ("Tab", "switch")];
    match app.active_tab {
        Tab::Live => {}
        Tab::Devices => hints.push(("j/k", "select")),
        Tab::Trends => {
            hints.push(("←/→", "day"));
            hints.push(("/", "search"));
            hints.push(("j/k", "location"));
        }
        Tab::Map => {
            hints.push(("j/k", "marker"));
            hints.push(("Enter", "details"));
            hints.push(("+/-", "zoom"));
        }
    }
    hints.push(("r", "refresh"));
    hints.push(("q", "quit"));
    hints
}

/// Draw the status bar with hints or the latest message, and the clock.
fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let time_str = Local::now().format("%H:%M:%S").to_string();

    let left_spans = if let Some(error) = &app.startup_error {
        vec![Span::styled(
            format!(" {}", error),
            Style::default().fg(theme.error),
        )]
    } else if let Some(msg) = app.current_status_message() {
        vec![Span::styled(format!(" {}", msg), theme.dim_style())]
    } else {
        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in context_hints(app).iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", Style::default().fg(theme.muted)));
            }
            spans.push(Span::styled(
                *key,
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {}", desc),
                Style::default().fg(theme.muted),
            ));
        }
        spans
    };

    let [left, right] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(10)]).areas(area);
    frame.render_widget(Paragraph::new(Line::from(left_spans)), left);
    frame.render_widget(
        Paragraph::new(time_str)
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Right),
        right,
    );
}

/// One line describing a poller's error or loading state, if any.
pub(super) fn poll_notice<T>(state: &PollState<T>, theme: &AppTheme) -> Option<Line<'static>> {
    if let Some(error) = &state.error {
        let text = if state.data.is_some() {
            format!(" {} (showing last data)", error)
        } else {
            format!(" {}", error)
        };
        let color = if state.data.is_some() {
            theme.warning
        } else {
            theme.error
        };
        return Some(Line::from(Span::styled(text, Style::default().fg(color))));
    }
    if state.data.is_none() {
        return Some(Line::from(Span::styled(" Loading...", theme.dim_style())));
    }
    None
}
