//! TUI Runner - main loop that owns the terminal
//!
//! Draws, waits for the next event, hands keys to the App. Every task change
//! is already written through by the session, so leaving the loop needs no
//! extra flush.

use std::time::Duration;

use eyre::Result;
use tracing::{debug, info};

use crate::config::UiConfig;
use crate::session::Session;

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::views;

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Application state
    app: App,
    /// Terminal handle
    terminal: Tui,
    /// Event handler
    event_handler: EventHandler,
}

impl TuiRunner {
    /// Create a new TuiRunner over a loaded session
    pub fn new(terminal: Tui, session: Session, ui: &UiConfig) -> Self {
        Self {
            app: App::new(session, ui),
            terminal,
            event_handler: EventHandler::new(Duration::from_millis(ui.tick_rate_ms.max(1))),
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        info!(
            tasks = self.app.editor().total_count(),
            "TuiRunner::run: starting"
        );

        loop {
            // Draw the UI
            self.terminal.draw(|frame| views::render(&self.app, frame))?;

            // Handle events
            match self.event_handler.next().await? {
                Event::Key(key_event) => {
                    if self.app.handle_key(key_event) {
                        break;
                    }
                }
                Event::Resize(width, height) => {
                    debug!(width, height, "TuiRunner::run: resize");
                }
                Event::Tick => {}
            }

            if self.app.state().should_quit {
                break;
            }
        }

        info!(
            tasks = self.app.editor().total_count(),
            "TuiRunner::run: exiting"
        );
        Ok(())
    }
}
