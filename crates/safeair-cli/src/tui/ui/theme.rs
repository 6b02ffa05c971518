//! Dashboard color palette.
//!
//! Slate neutrals with a cyan accent, in dark and light variants. Severity
//! colors are not part of the theme; they come from [`super::colors`].

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

/// Default border type for all blocks.
pub const BORDER_TYPE: BorderType = BorderType::Rounded;

/// UI colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct AppTheme {
    pub accent: Color,
    pub ok: Color,
    pub warning: Color,
    pub error: Color,
    pub text: Color,
    pub text_dim: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focus: Color,
    pub selection_bg: Color,
    pub header_bg: Color,
    pub background: Option<Color>,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl AppTheme {
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            accent: Color::Rgb(34, 211, 238),      // cyan-400
            ok: Color::Rgb(74, 222, 128),          // green-400
            warning: Color::Rgb(251, 191, 36),     // amber-400
            error: Color::Rgb(248, 113, 113),      // red-400
            text: Color::Rgb(241, 245, 249),       // slate-100
            text_dim: Color::Rgb(148, 163, 184),   // slate-400
            muted: Color::Rgb(100, 116, 139),      // slate-500
            border: Color::Rgb(71, 85, 105),       // slate-600
            border_focus: Color::Rgb(34, 211, 238),
            selection_bg: Color::Rgb(51, 65, 85),  // slate-700
            header_bg: Color::Rgb(15, 23, 42),     // slate-900
            background: None,
        }
    }

    #[must_use]
    pub const fn light() -> Self {
        Self {
            accent: Color::Rgb(8, 145, 178),       // cyan-600
            ok: Color::Rgb(22, 163, 74),           // green-600
            warning: Color::Rgb(217, 119, 6),      // amber-600
            error: Color::Rgb(220, 38, 38),        // red-600
            text: Color::Rgb(15, 23, 42),          // slate-900
            text_dim: Color::Rgb(71, 85, 105),     // slate-600
            muted: Color::Rgb(148, 163, 184),      // slate-400
            border: Color::Rgb(203, 213, 225),     // slate-300
            border_focus: Color::Rgb(8, 145, 178),
            selection_bg: Color::Rgb(226, 232, 240), // slate-200
            header_bg: Color::Rgb(241, 245, 249),  // slate-100
            background: Some(Color::Rgb(248, 250, 252)), // slate-50
        }
    }

    /// Bordered panel with a title.
    #[must_use]
    pub fn panel<'a>(&self, title: impl Into<String>, focused: bool) -> Block<'a> {
        let border = if focused { self.border_focus } else { self.border };
        Block::default()
            .borders(Borders::ALL)
            .border_type(BORDER_TYPE)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", title.into()))
            .title_style(self.title_style())
    }

    #[must_use]
    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.text)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    #[must_use]
    pub fn header_style(&self) -> Style {
        Style::default().bg(self.header_bg)
    }
}
