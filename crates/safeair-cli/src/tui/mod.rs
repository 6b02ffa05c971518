//! Main entry point for the TUI dashboard.
//!
//! This module handles terminal setup and restoration and runs the event
//! loop. Data arrives through the pollers owned by [`App`]; the loop only
//! draws, reads keys and ticks.

pub mod app;
pub mod input;
pub mod ui;

pub use app::{App, Tab, TuiOptions};

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::info;

/// Set up the terminal for TUI rendering.
///
/// Enables raw mode, mouse capture, and switches to the alternate screen buffer.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
///
/// Disables mouse capture, raw mode and returns to the main screen buffer.
pub fn restore_terminal() -> Result<()> {
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the dashboard until the user quits.
///
/// Must be called from within a Tokio runtime.
pub async fn run(options: TuiOptions) -> Result<()> {
    let mut app = App::new(options);
    info!("Dashboard started");

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app).await;
    restore_terminal()?;

    app.shutdown().await;
    info!("Dashboard stopped");
    result
}

/// Main event loop for the TUI.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit() {
        let size = terminal.size()?;
        app.set_map_surface(ui::map_surface(Rect::new(0, 0, size.width, size.height)));
        app.tick();

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = input::handle_key(key.code, app.editing_search);
            input::apply_action(app, action);
        }

        // Let poller tasks publish between frames.
        tokio::task::yield_now().await;
    }

    Ok(())
}
