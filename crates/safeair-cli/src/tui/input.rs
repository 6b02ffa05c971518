//! Keyboard input handling for the TUI.
//!
//! # Key Bindings
//!
//! | Key       | Action            |
//! |-----------|-------------------|
//! | `q`       | Quit              |
//! | `Tab` / `BackTab` | Next / previous tab |
//! | `1`-`4`   | Jump to tab       |
//! | `↓` / `j` | Select next       |
//! | `↑` / `k` | Select previous   |
//! | `←` / `→` | Previous / next trend day |
//! | `/`       | Search locations  |
//! | `r`       | Refresh now       |
//! | `Enter`   | Toggle map popup  |
//! | `+` / `-` | Zoom map          |
//! | `t`       | Toggle theme      |
//! | `?`       | Toggle help       |

use crossterm::event::KeyCode;

use super::app::{App, Tab};

/// User actions that can be triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextTab,
    PreviousTab,
    GoToTab(Tab),
    SelectNext,
    SelectPrevious,
    NextDay,
    PreviousDay,
    StartSearch,
    Refresh,
    TogglePopup,
    ZoomIn,
    ZoomOut,
    ToggleTheme,
    ToggleHelp,
    /// Close the topmost overlay.
    Dismiss,
    TextInput(char),
    TextBackspace,
    TextSubmit,
    TextCancel,
    /// No action (unrecognized key).
    None,
}

/// Map a key code to an action.
///
/// While `editing_text` is set, keys edit the search query instead.
pub fn handle_key(key: KeyCode, editing_text: bool) -> Action {
    if editing_text {
        return match key {
            KeyCode::Enter => Action::TextSubmit,
            KeyCode::Esc => Action::TextCancel,
            KeyCode::Backspace => Action::TextBackspace,
            KeyCode::Char(c) => Action::TextInput(c),
            _ => Action::None,
        };
    }

    match key {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab => Action::NextTab,
        KeyCode::BackTab => Action::PreviousTab,
        KeyCode::Char('1') => Action::GoToTab(Tab::Live),
        KeyCode::Char('2') => Action::GoToTab(Tab::Devices),
        KeyCode::Char('3') => Action::GoToTab(Tab::Trends),
        KeyCode::Char('4') => Action::GoToTab(Tab::Map),
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        KeyCode::Right | KeyCode::Char('l') => Action::NextDay,
        KeyCode::Left | KeyCode::Char('h') => Action::PreviousDay,
        KeyCode::Char('/') => Action::StartSearch,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Enter => Action::TogglePopup,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::ZoomIn,
        KeyCode::Char('-') | KeyCode::Char('_') => Action::ZoomOut,
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Esc => Action::Dismiss,
        _ => Action::None,
    }
}

/// Apply an action to the application state.
pub fn apply_action(app: &mut App, action: Action) {
    match action {
        Action::Quit => app.should_quit = true,
        Action::NextTab => {
            app.active_tab = app.active_tab.next();
            app.show_popup = false;
        }
        Action::PreviousTab => {
            app.active_tab = app.active_tab.previous();
            app.show_popup = false;
        }
        Action::GoToTab(tab) => {
            app.active_tab = tab;
            app.show_popup = false;
        }
        Action::SelectNext => app.select_next(),
        Action::SelectPrevious => app.select_previous(),
        Action::NextDay => {
            if app.active_tab == Tab::Trends {
                app.change_day(true);
            }
        }
        Action::PreviousDay => {
            if app.active_tab == Tab::Trends {
                app.change_day(false);
            }
        }
        Action::StartSearch => app.start_search(),
        Action::Refresh => app.refresh(),
        Action::TogglePopup => {
            if app.active_tab == Tab::Map {
                app.show_popup = !app.show_popup && app.selected_marker().is_some();
            }
        }
        Action::ZoomIn => {
            if app.active_tab == Tab::Map {
                app.zoom_in();
            }
        }
        Action::ZoomOut => {
            if app.active_tab == Tab::Map {
                app.zoom_out();
            }
        }
        Action::ToggleTheme => app.toggle_theme(),
        Action::ToggleHelp => app.show_help = !app.show_help,
        Action::Dismiss => {
            if app.show_help {
                app.show_help = false;
            } else {
                app.show_popup = false;
            }
        }
        Action::TextInput(c) => app.search_push(c),
        Action::TextBackspace => app.search_pop(),
        Action::TextSubmit => app.finish_search(),
        Action::TextCancel => app.cancel_search(),
        Action::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_keys() {
        assert_eq!(handle_key(KeyCode::Char('q'), false), Action::Quit);
        assert_eq!(handle_key(KeyCode::Tab, false), Action::NextTab);
        assert_eq!(handle_key(KeyCode::BackTab, false), Action::PreviousTab);
        assert_eq!(handle_key(KeyCode::Down, false), Action::SelectNext);
        assert_eq!(handle_key(KeyCode::Char('k'), false), Action::SelectPrevious);
        assert_eq!(handle_key(KeyCode::Right, false), Action::NextDay);
        assert_eq!(handle_key(KeyCode::Left, false), Action::PreviousDay);
        assert_eq!(handle_key(KeyCode::Char('4'), false), Action::GoToTab(Tab::Map));
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(handle_key(KeyCode::Char('/'), false), Action::StartSearch);
        assert_eq!(handle_key(KeyCode::Char('r'), false), Action::Refresh);
        assert_eq!(handle_key(KeyCode::Enter, false), Action::TogglePopup);
        assert_eq!(handle_key(KeyCode::Char('+'), false), Action::ZoomIn);
        assert_eq!(handle_key(KeyCode::Char('-'), false), Action::ZoomOut);
        assert_eq!(handle_key(KeyCode::Char('?'), false), Action::ToggleHelp);
        assert_eq!(handle_key(KeyCode::Char('x'), false), Action::None);
    }

    #[test]
    fn test_editing_captures_keys() {
        assert_eq!(handle_key(KeyCode::Char('q'), true), Action::TextInput('q'));
        assert_eq!(handle_key(KeyCode::Backspace, true), Action::TextBackspace);
        assert_eq!(handle_key(KeyCode::Enter, true), Action::TextSubmit);
        assert_eq!(handle_key(KeyCode::Esc, true), Action::TextCancel);
        assert_eq!(handle_key(KeyCode::Tab, true), Action::None);
    }
}
