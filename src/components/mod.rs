use crate::app::Action;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

pub mod register;
pub mod sign;

pub trait Component {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<Action>>;
    fn render(&self, frame: &mut Frame, area: Rect);
}
