use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Helper to create a centered rect
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Result from a yes/no dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Confirmed,
    Cancelled,
}

/// Purpose of the open confirmation, so the caller knows what to do on "yes"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPurpose {
    /// Leave the check-in wizard, discarding the session
    AbandonCheckIn,
    SignOut,
    Quit,
}

/// Yes/No confirmation popup
pub struct ConfirmDialog {
    pub visible: bool,
    pub purpose: Option<ConfirmPurpose>,
    title: String,
    message: String,
    /// true = "Sim" highlighted
    yes_selected: bool,
}

impl Default for ConfirmDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            purpose: None,
            title: String::new(),
            message: String::new(),
            yes_selected: false,
        }
    }

    pub fn show(&mut self, purpose: ConfirmPurpose) {
        let (title, message) = match purpose {
            ConfirmPurpose::AbandonCheckIn => (
                "Cancelar check-in",
                "Os dados deste check-in serão descartados. Deseja sair?",
            ),
            ConfirmPurpose::SignOut => ("Sair", "Deseja sair da sua conta?"),
            ConfirmPurpose::Quit => ("Fechar", "Deseja fechar o aplicativo?"),
        };
        self.title = title.to_string();
        self.message = message.to_string();
        self.purpose = Some(purpose);
        self.yes_selected = false;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.purpose = None;
    }

    /// Handle key input, returns Some(result) once the user decided
    pub fn handle_key(&mut self, key: KeyCode) -> Option<ConfirmResult> {
        match key {
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('y') | KeyCode::Char('Y') => {
                Some(ConfirmResult::Confirmed)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                Some(ConfirmResult::Cancelled)
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.yes_selected = !self.yes_selected;
                None
            }
            KeyCode::Enter => Some(if self.yes_selected {
                ConfirmResult::Confirmed
            } else {
                ConfirmResult::Cancelled
            }),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(2), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(self.message.as_str())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let selected = Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let normal = Style::default().fg(Color::Gray);
        let buttons = Line::from(vec![
            Span::styled(
                " [S]im ",
                if self.yes_selected { selected } else { normal },
            ),
            Span::raw("   "),
            Span::styled(
                " [N]ão ",
                if self.yes_selected { normal } else { selected },
            ),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[1],
        );
    }
}
