//! Simple content pages reachable from the drawer

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::AuthUser;

fn page_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn centered_text(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        chunks[1],
    );
}

pub fn render_home(frame: &mut Frame, area: Rect, user: Option<&AuthUser>) {
    let block = page_block("Home");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(Span::styled(
        "Bem-vindo!",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(user) = user {
        lines.push(Line::from(user.display_name()));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::raw(" novo check-in  "),
        Span::styled("m", Style::default().fg(Color::Yellow)),
        Span::raw(" menu"),
    ]));
    centered_text(frame, inner, lines);
}

pub fn render_checkout(frame: &mut Frame, area: Rect) {
    let block = page_block("Check-Out");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    centered_text(
        frame,
        inner,
        vec![
            Line::from(Span::styled(
                "Check-Out",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Em breve",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    );
}

/// Label/value rows for the profile page
pub fn profile_rows(user: &AuthUser) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Nome", user.display_name()),
        ("E-mail", user.email.clone().unwrap_or_default()),
    ];
    if let Some(avatar) = user.avatar_url() {
        rows.push(("Avatar", avatar.to_string()));
    }
    rows.push(("ID", user.id.clone()));
    rows
}

pub fn render_profile(frame: &mut Frame, area: Rect, user: Option<&AuthUser>) {
    let block = page_block("Meu Perfil");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(user) = user else {
        centered_text(frame, inner, vec![Line::from("Nenhum usuário conectado")]);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {} ", user.initials()),
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (label, value) in profile_rows(user) {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ]));
    }
    centered_text(frame, inner, lines);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::providers::auth::UserMetadata;

    #[test]
    fn test_profile_rows() {
        let user = AuthUser {
            id: "u1".to_string(),
            email: Some("ana@oficina.com".to_string()),
            user_metadata: UserMetadata {
                nome: Some("Ana Souza".to_string()),
                ..Default::default()
            },
        };
        let rows = profile_rows(&user);
        assert_eq!(rows[0], ("Nome", "Ana Souza".to_string()));
        assert_eq!(rows[1], ("E-mail", "ana@oficina.com".to_string()));
        assert_eq!(rows.last().unwrap().0, "ID");
    }
}
