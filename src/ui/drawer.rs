//! Side navigation for the signed-in area

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::api::providers::auth::{initials, DEFAULT_DISPLAY_NAME};
use crate::api::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    CheckIn,
    CheckOut,
    Profile,
}

impl Route {
    pub fn all() -> &'static [Route] {
        &[Route::Home, Route::CheckIn, Route::CheckOut, Route::Profile]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::CheckIn => "Check-In",
            Route::CheckOut => "Check-Out",
            Route::Profile => "Meu Perfil",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerAction {
    Navigate(Route),
    SignOut,
    Close,
}

/// Index of the "Sair" entry, after the routes
const SIGN_OUT_INDEX: usize = 4;

pub struct Drawer {
    pub open: bool,
    state: ListState,
}

impl Default for Drawer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawer {
    pub fn new() -> Self {
        let mut state = ListState::default();
        state.select(Some(0));
        Self { open: false, state }
    }

    /// Open with the current route highlighted
    pub fn show(&mut self, current: Route) {
        let idx = Route::all().iter().position(|r| *r == current).unwrap_or(0);
        self.state.select(Some(idx));
        self.open = true;
    }

    pub fn selected(&self) -> usize {
        self.state.selected().unwrap_or(0)
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<DrawerAction> {
        let selected = self.selected();
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select(Some(selected.saturating_sub(1)));
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.select(Some((selected + 1).min(SIGN_OUT_INDEX)));
                None
            }
            KeyCode::Enter => {
                self.open = false;
                Some(match Route::all().get(selected) {
                    Some(route) => DrawerAction::Navigate(*route),
                    None => DrawerAction::SignOut,
                })
            }
            KeyCode::Esc | KeyCode::Char('m') | KeyCode::Tab => {
                self.open = false;
                Some(DrawerAction::Close)
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, user: Option<&AuthUser>, current: Route) {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(5)])
            .split(inner);

        let (name, badge, email) = match user {
            Some(u) => (
                u.display_name(),
                u.initials(),
                u.email.clone().unwrap_or_default(),
            ),
            None => (
                DEFAULT_DISPLAY_NAME.to_string(),
                initials(DEFAULT_DISPLAY_NAME),
                String::new(),
            ),
        };
        let header = vec![
            Line::from(vec![
                Span::styled(
                    format!(" {} ", badge),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(Span::styled(email, Style::default().fg(Color::DarkGray))),
        ];
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let mut items: Vec<ListItem> = Route::all()
            .iter()
            .map(|route| {
                let style = if *route == current {
                    Style::default().fg(Color::LightBlue)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(Span::styled(route.label(), style))
            })
            .collect();
        items.push(ListItem::new(Span::styled(
            "Sair",
            Style::default().fg(Color::Red),
        )));

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[1], &mut self.state);
    }
}
