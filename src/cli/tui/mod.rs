//! Interactive TUI board
//!
//! Renders the board with ratatui and feeds key presses and ticks to the
//! board engine. Cards are dragged with the keyboard: pick one up with space,
//! steer the drop marker with h/j/k/l, drop with enter or cancel with esc.

mod app;
mod event;
mod terminal;
mod views;

use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

use super::Output;
use crate::config::Config;
use crate::domain::{BoardEngine, SystemClock};
use app::App;
use event::EventHandler;

/// Launch the TUI
pub fn run(output: &Output, config: &Config) -> Result<()> {
    output.verbose_ctx("tui", "Initializing TUI application");

    // Build state before touching the terminal so config errors print normally
    let engine = BoardEngine::new(
        config.build_board()?,
        config.engine_settings(),
        config.heartbeat(),
        Box::new(SystemClock),
    );
    let mut app = App::new(engine, output.is_verbose());

    let mut terminal = terminal::init()?;
    let event_handler = EventHandler::new(config.timers.tick_rate_ms);

    // Run the main loop with panic safety
    // This ensures terminal is restored even if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        app.run(&mut terminal, event_handler)
    }));

    let restore_result = terminal::restore();

    match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            let _ = restore_result;
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else {
                Err(anyhow!("TUI panicked with unknown error"))
            }
        }
    }
}
