//! Terminal session for the sign-in form.
//!
//! [`Tui::enter`] switches the terminal into raw mode on the alternate screen;
//! dropping the [`Tui`] puts it back, including on early returns and panics
//! that unwind through `main`.

use anyhow::Result;
use crossterm::{
    event,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::warn;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};

/// Input poll interval, roughly 30 redraws a second.
const TICK_RATE: Duration = Duration::from_millis(33);

#[derive(Debug, Clone)]
pub enum Event {
    Input(event::Event),
    Tick,
}

pub type Frame<'a> = ratatui::Frame<'a>;

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl Tui {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        match Self::setup() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                let _ = restore();
                Err(e)
            }
        }
    }

    fn setup() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        crossterm::execute!(io::stdout(), EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(terminal)
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Waits one tick for input, yielding `Tick` when none arrives.
    pub fn next_event(&self) -> Result<Event> {
        if event::poll(TICK_RATE)? {
            return Ok(Event::Input(event::read()?));
        }
        Ok(Event::Tick)
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        if let Err(e) = restore() {
            warn!("failed to restore terminal: {e}");
        }
    }
}

fn restore() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_is_safe_without_a_session() {
        assert!(restore().is_ok());
        assert!(restore().is_ok());
    }
}
