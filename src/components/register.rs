//! Registration panel. Registration itself is not implemented yet; the panel
//! only holds its place in the selector.

use crate::app::Action;
use crate::components::Component;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

#[derive(Debug, Default)]
pub struct RegisterPanel;

impl RegisterPanel {
    pub fn new() -> Self {
        Self
    }
}

impl Component for RegisterPanel {
    fn handle_input(&mut self, _event: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Register ");
        let todo = Paragraph::new("todo")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(todo, area);
    }
}
