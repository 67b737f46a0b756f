//! The main application state and logic for signform.
//!
//! This module owns the credential store and the two panels, routes key events
//! to the active panel and turns submit requests into sign-in attempts.

use crate::auth;
use crate::components::{register::RegisterPanel, sign::SignPanel, Component};
use crate::db::CredentialStore;
use crate::tui::{self, Frame, Tui};
use crate::utils::centered_rect;
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};

/// Requests a component hands back to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Attempt to sign in with the current field values.
    Submit,
}

/// The two mutually exclusive panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Sign,
    Register,
}

impl Panel {
    fn index(self) -> usize {
        match self {
            Panel::Sign => 0,
            Panel::Register => 1,
        }
    }
}

/// Main application struct for signform.
pub struct App {
    /// The visible panel.
    pub panel: Panel,
    /// Flag indicating if the application should quit.
    pub should_quit: bool,
    pub sign: SignPanel,
    pub register: RegisterPanel,
    /// `None` when the store failed to open; sign-in is disabled then.
    store: Option<CredentialStore>,
    credential_count: Option<i64>,
    /// Flag to indicate if the exit confirmation dialog is open
    pub show_exit_dialog: bool,
    /// Selected option in the exit dialog (0: Yes, 1: No)
    pub exit_dialog_selected: usize,
}

impl App {
    pub fn new(store: Option<CredentialStore>) -> Self {
        let credential_count = store.as_ref().and_then(|s| match s.count() {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("failed to count credentials: {e}");
                None
            }
        });

        Self {
            panel: Panel::Sign,
            should_quit: false,
            sign: SignPanel::new(),
            register: RegisterPanel::new(),
            store,
            credential_count,
            show_exit_dialog: false,
            exit_dialog_selected: 0,
        }
    }

    /// Runs the application's main loop.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing or reading terminal events fails.
    pub fn run(&mut self, tui: &mut Tui) -> Result<()> {
        while !self.should_quit {
            tui.draw(|frame| self.render_ui(frame))?;
            match tui.next_event()? {
                tui::Event::Input(event) => self.handle_event(event)?,
                tui::Event::Tick => self.sign.check_status_timeout(),
            }
        }
        Ok(())
    }

    /// Hands the store back so the caller can close it explicitly.
    pub fn take_store(&mut self) -> Option<CredentialStore> {
        self.store.take()
    }

    /// Shows `panel`. Returns `false` when it was already visible.
    pub fn select_panel(&mut self, panel: Panel) -> bool {
        if self.panel == panel {
            return false;
        }
        info!("switching to {panel:?} panel");
        self.panel = panel;
        true
    }

    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global keybinding: Ctrl+Q to quit
        if ctrl && key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return Ok(());
        }

        if self.show_exit_dialog {
            self.handle_exit_dialog_input(key);
            return Ok(());
        }

        match key.code {
            KeyCode::F(1) => {
                self.select_panel(Panel::Sign);
            }
            KeyCode::F(2) => {
                self.select_panel(Panel::Register);
            }
            KeyCode::Char('s') if ctrl => {
                self.select_panel(Panel::Sign);
            }
            KeyCode::Char('r') if ctrl => {
                self.select_panel(Panel::Register);
            }
            KeyCode::Esc => self.show_exit_dialog = true,
            _ => {
                let action = match self.panel {
                    Panel::Sign => self.sign.handle_input(key)?,
                    Panel::Register => self.register.handle_input(key)?,
                };
                if let Some(Action::Submit) = action {
                    self.submit();
                }
            }
        }
        Ok(())
    }

    fn handle_exit_dialog_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Right => {
                self.exit_dialog_selected = 1 - self.exit_dialog_selected;
            }
            KeyCode::Enter => {
                if self.exit_dialog_selected == 0 {
                    self.should_quit = true;
                } else {
                    self.show_exit_dialog = false;
                }
            }
            KeyCode::Esc => self.show_exit_dialog = false,
            _ => {}
        }
    }

    fn submit(&mut self) {
        let Some(store) = &self.store else {
            warn!("sign-in attempted without a credential store");
            self.sign
                .set_error("Sign-in unavailable: credential store not open.".to_string());
            return;
        };

        match auth::sign_in(store, &self.sign.credentials()) {
            Ok(outcome) => self.sign.show_outcome(outcome),
            Err(e) => {
                warn!("sign-in failed: {e}");
                self.sign.set_error(format!("Sign-in failed: {e}"));
            }
        }
    }

    pub fn render_ui(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Selector
                Constraint::Min(12),   // Panel
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        let selector = Tabs::new(vec![" sign ", " register "])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(" signform "),
            )
            .select(self.panel.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(selector, layout[0]);

        match self.panel {
            Panel::Sign => self.sign.render(frame, layout[1]),
            Panel::Register => self.register.render(frame, layout[1]),
        }

        let store_info = match (&self.store, self.credential_count) {
            (Some(store), Some(count)) => {
                format!("store `{}`: {count} credential(s)", store.connection_name())
            }
            (Some(store), None) => format!("store `{}`", store.connection_name()),
            (None, _) => "store unavailable, sign-in disabled".to_string(),
        };
        let footer = Paragraph::new(Line::from(vec![
            Span::styled(
                "F1 sign  F2 register  Esc exit  ",
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(store_info, Style::default().fg(Color::Gray)),
        ]));
        frame.render_widget(footer, layout[2]);

        if self.show_exit_dialog {
            let dialog_area = centered_rect(60, 20, frame.area());
            let dialog_block = Block::default()
                .title("Confirm Exit")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded);

            let text = vec![
                Line::from("Are you sure you want to quit?"),
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        " Yes ",
                        Style::default().fg(if self.exit_dialog_selected == 0 {
                            Color::Green
                        } else {
                            Color::DarkGray
                        }),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        " No ",
                        Style::default().fg(if self.exit_dialog_selected == 1 {
                            Color::Red
                        } else {
                            Color::DarkGray
                        }),
                    ),
                ]),
            ];

            let dialog_paragraph = Paragraph::new(text)
                .block(dialog_block)
                .alignment(Alignment::Center);

            frame.render_widget(Clear, dialog_area);
            frame.render_widget(dialog_paragraph, dialog_area);
        }
    }
}
