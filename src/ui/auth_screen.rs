//! Login, sign-up and password recovery forms shown while signed out

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::api::providers::auth::{SignInData, SignUpData};
use crate::auth::forms::{error_for, Field, ForgotPasswordForm, FormError, SignInForm, SignUpForm};
use crate::ui::dialogs::centered_rect;
use crate::ui::form_field::FormField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
    ForgotPassword,
}

impl AuthMode {
    fn title(&self) -> &'static str {
        match self {
            AuthMode::SignIn => "Entrar",
            AuthMode::SignUp => "Criar conta",
            AuthMode::ForgotPassword => "Esqueci minha senha",
        }
    }

    fn button(&self, busy: bool) -> &'static str {
        match (self, busy) {
            (AuthMode::SignIn, false) => "Entrar",
            (AuthMode::SignIn, true) => "Entrando...",
            (AuthMode::SignUp, false) => "Cadastrar",
            (AuthMode::SignUp, true) => "Cadastrando...",
            (AuthMode::ForgotPassword, false) => "Enviar link",
            (AuthMode::ForgotPassword, true) => "Enviando...",
        }
    }

    fn fields(&self) -> &'static [Field] {
        match self {
            AuthMode::SignIn => &[Field::Email, Field::Password],
            AuthMode::SignUp => &[
                Field::Name,
                Field::Email,
                Field::Password,
                Field::ConfirmPassword,
            ],
            AuthMode::ForgotPassword => &[Field::Email],
        }
    }
}

/// What the app should do after a key press on the auth screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    SignIn(SignInData),
    SignUp(SignUpData),
    ForgotPassword(String),
    Quit,
}

fn placeholder(field: Field) -> &'static str {
    match field {
        Field::Name => "Digite seu nome completo",
        Field::Email => "Digite seu e-mail",
        Field::Password => "Digite sua senha",
        Field::ConfirmPassword => "Confirme sua senha",
    }
}

fn label(field: Field) -> &'static str {
    match field {
        Field::Name => "Nome completo",
        Field::ConfirmPassword => "Confirma Senha",
        other => other.label(),
    }
}

pub struct AuthScreen {
    pub mode: AuthMode,
    /// Set while a request is in flight; input is ignored meanwhile
    pub busy: bool,
    fields: Vec<(Field, FormField)>,
    focus: usize,
    errors: Vec<FormError>,
    show_passwords: bool,
}

impl AuthScreen {
    pub fn new(show_passwords: bool) -> Self {
        let mut screen = Self {
            mode: AuthMode::SignIn,
            busy: false,
            fields: Vec::new(),
            focus: 0,
            errors: Vec::new(),
            show_passwords,
        };
        screen.switch(AuthMode::SignIn);
        screen
    }

    /// Change form, keeping a typed e-mail
    pub fn switch(&mut self, mode: AuthMode) {
        let email = self.value(Field::Email);
        self.mode = mode;
        self.fields = mode
            .fields()
            .iter()
            .map(|&f| {
                let widget = match f {
                    Field::Password | Field::ConfirmPassword => {
                        FormField::password(placeholder(f), !self.show_passwords)
                    }
                    _ => FormField::text(placeholder(f)),
                };
                (f, widget)
            })
            .collect();
        self.set_value(Field::Email, &email);
        self.focus = 0;
        self.errors.clear();
        self.busy = false;
    }

    pub fn value(&self, field: Field) -> String {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, w)| w.value())
            .unwrap_or_default()
    }

    pub fn set_value(&mut self, field: Field, value: &str) {
        if let Some((_, widget)) = self.fields.iter_mut().find(|(f, _)| *f == field) {
            widget.set_value(value);
        }
    }

    pub fn errors(&self) -> &[FormError] {
        &self.errors
    }

    pub fn focused_field(&self) -> Option<Field> {
        self.fields.get(self.focus).map(|(f, _)| *f)
    }

    /// Run the form's validation; on success the request to send
    pub fn submit(&mut self) -> Option<AuthAction> {
        let result = match self.mode {
            AuthMode::SignIn => SignInForm {
                email: self.value(Field::Email).trim().to_string(),
                password: self.value(Field::Password),
            }
            .validate()
            .map(AuthAction::SignIn),
            AuthMode::SignUp => SignUpForm {
                name: self.value(Field::Name).trim().to_string(),
                email: self.value(Field::Email).trim().to_string(),
                password: self.value(Field::Password),
                confirm_password: self.value(Field::ConfirmPassword),
            }
            .validate()
            .map(AuthAction::SignUp),
            AuthMode::ForgotPassword => ForgotPasswordForm {
                email: self.value(Field::Email).trim().to_string(),
            }
            .validate()
            .map(AuthAction::ForgotPassword),
        };

        match result {
            Ok(action) => {
                self.errors.clear();
                self.busy = true;
                Some(action)
            }
            Err(errors) => {
                tracing::debug!(mode = ?self.mode, errors = errors.len(), "Form validation failed");
                if let Some(pos) = self
                    .fields
                    .iter()
                    .position(|(f, _)| error_for(&errors, *f).is_some())
                {
                    self.focus = pos;
                }
                self.errors = errors;
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<AuthAction> {
        if self.busy {
            return None;
        }

        match key {
            KeyCode::Esc => {
                if self.mode == AuthMode::SignIn {
                    return Some(AuthAction::Quit);
                }
                self.switch(AuthMode::SignIn);
            }
            KeyCode::F(2) => {
                let next = if self.mode == AuthMode::SignUp {
                    AuthMode::SignIn
                } else {
                    AuthMode::SignUp
                };
                self.switch(next);
            }
            KeyCode::F(3) => self.switch(AuthMode::ForgotPassword),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len().max(1);
            }
            KeyCode::BackTab | KeyCode::Up => {
                let len = self.fields.len().max(1);
                self.focus = (self.focus + len - 1) % len;
            }
            KeyCode::Enter => {
                if self.focus + 1 < self.fields.len() {
                    self.focus += 1;
                } else {
                    return self.submit();
                }
            }
            other => {
                if let Some((field, widget)) = self.fields.get_mut(self.focus) {
                    if widget.handle_key(other) {
                        let field = *field;
                        self.errors.retain(|e| e.field != field);
                    }
                }
            }
        }
        None
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = centered_rect(60, 80, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "Oficina",
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" {} ", self.mode.title())),
            ]))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(2)];
        for _ in &self.fields {
            constraints.push(Constraint::Length(1)); // label
            constraints.push(Constraint::Length(1)); // input
            constraints.push(Constraint::Length(1)); // error
        }
        constraints.push(Constraint::Length(1)); // button
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(2)); // footer

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints(constraints)
            .split(inner);

        let heading = Paragraph::new(Span::styled(
            self.mode.title(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(heading, chunks[0]);

        let focus = self.focus;
        let busy = self.busy;
        for (i, (field, widget)) in self.fields.iter_mut().enumerate() {
            let base = 1 + i * 3;
            let focused = i == focus && !busy;
            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            frame.render_widget(
                Paragraph::new(Span::styled(label(*field), label_style)),
                chunks[base],
            );
            widget.render(frame, indent(chunks[base + 1]), focused);
            if let Some(err) = error_for(&self.errors, *field) {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        err.message,
                        Style::default().fg(Color::Red),
                    )),
                    indent(chunks[base + 2]),
                );
            }
        }

        let button_idx = 1 + self.fields.len() * 3;
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {} ", self.mode.button(self.busy)),
                Style::default()
                    .fg(Color::Black)
                    .bg(if self.busy { Color::DarkGray } else { Color::Cyan })
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            chunks[button_idx],
        );

        let key = Style::default().fg(Color::Yellow);
        let footer = match self.mode {
            AuthMode::SignIn => vec![
                Line::from(vec![
                    Span::styled("Enter", key),
                    Span::raw(" entrar  "),
                    Span::styled("Tab", key),
                    Span::raw(" próximo campo  "),
                    Span::styled("Esc", key),
                    Span::raw(" sair"),
                ]),
                Line::from(vec![
                    Span::styled("F2", key),
                    Span::raw(" criar conta  "),
                    Span::styled("F3", key),
                    Span::raw(" esqueci minha senha"),
                ]),
            ],
            AuthMode::SignUp => vec![
                Line::from(vec![
                    Span::styled("Enter", key),
                    Span::raw(" cadastrar  "),
                    Span::styled("Tab", key),
                    Span::raw(" próximo campo"),
                ]),
                Line::from(vec![
                    Span::raw("Já tem uma conta? "),
                    Span::styled("F2", key),
                    Span::raw(" entrar"),
                ]),
            ],
            AuthMode::ForgotPassword => vec![
                Line::from(vec![
                    Span::styled("Enter", key),
                    Span::raw(" enviar link de recuperação"),
                ]),
                Line::from(vec![Span::styled("Esc", key), Span::raw(" voltar")]),
            ],
        };
        frame.render_widget(
            Paragraph::new(footer).alignment(Alignment::Center),
            chunks[button_idx + 2],
        );
    }
}

fn indent(area: Rect) -> Rect {
    Rect {
        x: area.x + 2,
        width: area.width.saturating_sub(2),
        ..area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(screen: &mut AuthScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_sign_in_submits_on_last_field() {
        let mut screen = AuthScreen::new(false);
        type_text(&mut screen, "ana@oficina.com");
        assert_eq!(screen.handle_key(KeyCode::Enter), None);
        assert_eq!(screen.focused_field(), Some(Field::Password));
        type_text(&mut screen, "segredo");

        let action = screen.handle_key(KeyCode::Enter);
        assert_eq!(
            action,
            Some(AuthAction::SignIn(SignInData {
                email: "ana@oficina.com".to_string(),
                password: "segredo".to_string(),
            }))
        );
        assert!(screen.busy);
        assert_eq!(screen.handle_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_invalid_sign_up_focuses_first_error() {
        let mut screen = AuthScreen::new(false);
        screen.switch(AuthMode::SignUp);
        screen.set_value(Field::Name, "Ana Souza");
        screen.set_value(Field::Email, "ana@oficina.com");
        screen.set_value(Field::Password, "123456");
        screen.set_value(Field::ConfirmPassword, "654321");

        assert_eq!(screen.submit(), None);
        assert_eq!(screen.focused_field(), Some(Field::ConfirmPassword));
        assert_eq!(
            error_for(screen.errors(), Field::ConfirmPassword).map(|e| e.message),
            Some("As senhas não coincidem")
        );

        // Typing into the field clears its error
        screen.handle_key(KeyCode::Backspace);
        assert!(screen.errors().is_empty());
    }

    #[test]
    fn test_switch_keeps_email() {
        let mut screen = AuthScreen::new(false);
        type_text(&mut screen, "ana@oficina.com");
        screen.handle_key(KeyCode::F(3));
        assert_eq!(screen.mode, AuthMode::ForgotPassword);
        assert_eq!(
            screen.handle_key(KeyCode::Enter),
            Some(AuthAction::ForgotPassword("ana@oficina.com".to_string()))
        );
    }

    #[test]
    fn test_escape_navigation() {
        let mut screen = AuthScreen::new(false);
        screen.handle_key(KeyCode::F(2));
        assert_eq!(screen.mode, AuthMode::SignUp);
        assert_eq!(screen.handle_key(KeyCode::Esc), None);
        assert_eq!(screen.mode, AuthMode::SignIn);
        assert_eq!(screen.handle_key(KeyCode::Esc), Some(AuthAction::Quit));
    }
}
