//! Overlay rendering for the TUI: marker popup and help.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::colors::severity_color;
use super::theme::{AppTheme, BORDER_TYPE};
use crate::tui::app::App;

/// Rectangle of `width` x `height` centered in `area`, clipped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Draw the info popup for the selected map marker.
pub(super) fn draw_marker_popup(frame: &mut Frame, app: &App, theme: &AppTheme) {
    let Some(marker) = app.selected_marker() else {
        return;
    };

    let info = marker.info_lines();
    let widest = info.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let popup_area = centered(frame.area(), widest + 6, info.len() as u16 + 4);
    frame.render_widget(Clear, popup_area);

    let color = severity_color(marker.severity);
    let mut lines: Vec<Line> = Vec::with_capacity(info.len() + 2);
    let mut info = info.into_iter();
    if let Some(uid) = info.next() {
        lines.push(Line::from(Span::styled(
            uid,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }
    lines.extend(info.map(|l| Line::from(Span::styled(l, Style::default().fg(theme.text)))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Enter or Esc to close", theme.dim_style())));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BORDER_TYPE)
            .border_style(Style::default().fg(color))
            .title(Span::styled(" Device ", theme.title_style())),
    );
    frame.render_widget(popup, popup_area);
}

/// Draw help overlay with keyboard shortcuts.
pub(super) fn draw_help_overlay(frame: &mut Frame, theme: &AppTheme) {
    let lines = vec![
        section("--- Navigation ---", theme),
        shortcut_line("Tab/Shift+Tab", "Next/Prev tab", theme),
        shortcut_line("1-4", "Go to tab", theme),
        shortcut_line("j/k", "Next/Prev row or marker", theme),
        shortcut_line("l/h", "Next/Prev day (Trends)", theme),
        Line::from(""),
        section("--- Actions ---", theme),
        shortcut_line("/", "Search locations", theme),
        shortcut_line("r", "Refresh now", theme),
        shortcut_line("Enter", "Marker details (Map)", theme),
        shortcut_line("+/-", "Zoom (Map)", theme),
        shortcut_line("t", "Toggle theme", theme),
        Line::from(""),
        section("--- Other ---", theme),
        shortcut_line("?", "Toggle help", theme),
        shortcut_line("Esc", "Close overlay", theme),
        shortcut_line("q", "Quit", theme),
        Line::from(""),
        Line::from(Span::styled("Press ? or Esc to close", theme.dim_style())),
    ];

    let help_area = centered(frame.area(), 48, lines.len() as u16 + 2);
    frame.render_widget(Clear, help_area);

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BORDER_TYPE)
            .border_style(Style::default().fg(theme.border_focus))
            .title(Span::styled(" Keyboard Shortcuts ", theme.title_style())),
    );
    frame.render_widget(help, help_area);
}

fn section(title: &'static str, theme: &AppTheme) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    ))
}

fn shortcut_line(key: &'static str, action: &'static str, theme: &AppTheme) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:>14}  ", key),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(action, Style::default().fg(theme.text)),
    ])
}
