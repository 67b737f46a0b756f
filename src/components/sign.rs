//! Sign-in panel for signform.

use crate::app::Action;
use crate::auth::{Credentials, SignInOutcome};
use crate::components::Component;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use log::debug;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use std::time::{Duration, Instant};

const NAME_FIELD: usize = 0;
const PASSWORD_FIELD: usize = 1;
const SIGN_BUTTON: usize = 2;
const FORGOT_BUTTON: usize = 3;
const FOCUS_COUNT: usize = 4;

/// How long a status message stays on screen.
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(String),
    Error(String),
}

/// Represents the sign-in UI component.
#[derive(Debug, Default)]
pub struct SignPanel {
    /// The user name input field.
    pub username: String,
    /// The password input field.
    pub password: String,
    /// Focused element (0: name, 1: password, 2: sign in, 3: forgot password)
    pub selected_index: usize,
    /// Whether the sign in button accepts presses.
    submit_enabled: bool,
    /// Outcome of the last attempt, if any.
    pub status: Option<Status>,
    status_time: Option<Instant>,
}

impl SignPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// Recomputes the sign in button state. Called on every edit of either field.
    pub fn update_submit_state(&mut self) {
        self.submit_enabled = self.credentials().is_complete();
    }

    pub fn show_outcome(&mut self, outcome: SignInOutcome) {
        let message = outcome.message().to_string();
        match outcome {
            SignInOutcome::Success => self.set_status(Status::Success(message)),
            SignInOutcome::PasswordMismatch | SignInOutcome::UserNotFound => {
                self.set_status(Status::Error(message))
            }
        }
    }

    pub fn set_error(&mut self, message: String) {
        self.set_status(Status::Error(message));
    }

    fn set_status(&mut self, status: Status) {
        self.status = Some(status);
        self.status_time = Some(Instant::now());
    }

    fn clear_status(&mut self) {
        self.status = None;
        self.status_time = None;
    }

    /// Hides the status message once it has been shown long enough.
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() >= STATUS_TIMEOUT {
                self.clear_status();
            }
        }
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        match self.selected_index {
            NAME_FIELD => edit(&mut self.username),
            PASSWORD_FIELD => edit(&mut self.password),
            _ => return,
        }
        self.update_submit_state();
        self.clear_status();
    }

    fn field_block(&self, title: &'static str, index: usize) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(title)
            .style(Style::default().fg(if self.selected_index == index {
                Color::Cyan
            } else {
                Color::White
            }))
    }

    fn button(&self, label: &'static str, index: usize, enabled: bool) -> Span<'static> {
        let style = if !enabled {
            Style::default().fg(Color::DarkGray)
        } else if self.selected_index == index {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)
        };
        Span::styled(label, style)
    }
}

impl Component for SignPanel {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<Action>> {
        self.check_status_timeout();

        match event.code {
            KeyCode::Char(c) => self.edit_focused(|field| field.push(c)),
            KeyCode::Backspace => self.edit_focused(|field| {
                field.pop();
            }),
            KeyCode::Tab | KeyCode::Down => {
                self.selected_index = (self.selected_index + 1) % FOCUS_COUNT;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.selected_index = (self.selected_index + FOCUS_COUNT - 1) % FOCUS_COUNT;
            }
            KeyCode::Enter => match self.selected_index {
                FORGOT_BUTTON => debug!("forgot password pressed"),
                _ if self.submit_enabled() => return Ok(Some(Action::Submit)),
                _ => {}
            },
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Subtitle
                Constraint::Length(1), // Spacing
                Constraint::Length(3), // User name
                Constraint::Length(3), // Password
                Constraint::Length(1), // Spacing
                Constraint::Length(1), // Buttons
                Constraint::Length(1), // Spacing
                Constraint::Length(1), // Status
                Constraint::Min(0),
            ])
            .margin(1)
            .split(area);

        let subtitle = Paragraph::new(Span::styled(
            "Sign in",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(subtitle, layout[0]);

        let field_area = |row: Rect| {
            row.inner(Margin {
                vertical: 0,
                horizontal: 1,
            })
        };

        let name_input = if self.username.is_empty() {
            Paragraph::new(Span::styled(
                "input user name",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Paragraph::new(self.username.as_str())
        };
        frame.render_widget(
            name_input.block(self.field_block(" User name ", NAME_FIELD)),
            field_area(layout[2]),
        );

        let password_input = if self.password.is_empty() {
            Paragraph::new(Span::styled(
                "input password",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Paragraph::new("•".repeat(self.password.chars().count()))
        };
        frame.render_widget(
            password_input.block(self.field_block(" User password ", PASSWORD_FIELD)),
            field_area(layout[3]),
        );

        let buttons = Paragraph::new(Line::from(vec![
            self.button(" Sign in ", SIGN_BUTTON, self.submit_enabled()),
            Span::raw("    "),
            self.button(" Forgot password ", FORGOT_BUTTON, true),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(buttons, layout[5]);

        if let Some(status) = &self.status {
            let (text, color) = match status {
                Status::Success(text) => (text.as_str(), Color::Green),
                Status::Error(text) => (text.as_str(), Color::Red),
            };
            let status = Paragraph::new(text)
                .style(Style::default().fg(color))
                .alignment(Alignment::Center);
            frame.render_widget(status, layout[7]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn fill(panel: &mut SignPanel, name: &str, password: &str) {
        panel.username = name.to_string();
        panel.password = password.to_string();
        panel.update_submit_state();
    }

    fn type_text(panel: &mut SignPanel, text: &str) {
        for c in text.chars() {
            panel.handle_input(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn submit_disabled_until_both_fields_filled() {
        let mut panel = SignPanel::new();
        assert!(!panel.submit_enabled());

        type_text(&mut panel, "testUser");
        assert!(!panel.submit_enabled());

        panel.handle_input(key(KeyCode::Tab)).unwrap();
        type_text(&mut panel, "pw");
        assert!(panel.submit_enabled());

        panel.handle_input(key(KeyCode::Backspace)).unwrap();
        panel.handle_input(key(KeyCode::Backspace)).unwrap();
        assert!(!panel.submit_enabled());
    }

    #[test]
    fn whitespace_only_field_keeps_submit_disabled() {
        let mut panel = SignPanel::new();
        fill(&mut panel, " ", "x");
        assert!(!panel.submit_enabled());

        fill(&mut panel, "a", "x");
        assert!(panel.submit_enabled());
        fill(&mut panel, "a", "  \t");
        assert!(!panel.submit_enabled());
    }

    #[test]
    fn enter_submits_only_when_enabled() {
        let mut panel = SignPanel::new();
        assert_eq!(panel.handle_input(key(KeyCode::Enter)).unwrap(), None);

        fill(&mut panel, "testUser", "testPassword");
        assert_eq!(
            panel.handle_input(key(KeyCode::Enter)).unwrap(),
            Some(Action::Submit)
        );
    }

    #[test]
    fn forgot_password_does_nothing() {
        let mut panel = SignPanel::new();
        fill(&mut panel, "testUser", "testPassword");
        panel.handle_input(key(KeyCode::Up)).unwrap();
        assert_eq!(panel.selected_index, FORGOT_BUTTON);
        assert_eq!(panel.handle_input(key(KeyCode::Enter)).unwrap(), None);
    }

    #[test]
    fn typing_on_a_button_leaves_fields_alone() {
        let mut panel = SignPanel::new();
        panel.selected_index = SIGN_BUTTON;
        type_text(&mut panel, "abc");
        assert!(panel.username.is_empty());
        assert!(panel.password.is_empty());
    }

    #[test]
    fn editing_clears_previous_outcome() {
        let mut panel = SignPanel::new();
        panel.show_outcome(SignInOutcome::UserNotFound);
        assert_eq!(
            panel.status,
            Some(Status::Error("User not found.".to_string()))
        );
        type_text(&mut panel, "a");
        assert_eq!(panel.status, None);
    }
}
