//! Step 2: photos and videos of the vehicle

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

use super::{footer, section_title, step_block};
use crate::checkin::MediaKind;
use crate::ui::checkin::CheckInScreen;

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

impl CheckInScreen {
    pub(crate) fn render_media_step(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        recording: Option<Duration>,
    ) {
        let inner = step_block(frame, area, self.step());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(1), // Counts / recording
                Constraint::Min(4),    // Media list
                Constraint::Length(3), // Import prompt
                Constraint::Length(1), // Footer
            ])
            .split(inner);

        frame.render_widget(section_title("Upload de media"), chunks[0]);

        let status = match recording {
            Some(elapsed) => Line::from(vec![
                Span::styled(
                    "● Gravando ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format_elapsed(elapsed)),
                Span::styled("  (s para parar)", Style::default().fg(Color::DarkGray)),
            ]),
            None => {
                let (photos, videos) = self.session.media().counts();
                Line::from(Span::styled(
                    format!("{} foto(s), {} vídeo(s)", photos, videos),
                    Style::default().fg(Color::Gray),
                ))
            }
        };
        frame.render_widget(Paragraph::new(status), chunks[1]);

        if self.session.media().is_empty() {
            frame.render_widget(
                Paragraph::new(
                    "Analise o automóvel inteiro e verifique se existe alguma avaria \
                     externamente e internamente. Tire fotos ou grave videos.",
                )
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
                chunks[2],
            );
        } else {
            let items: Vec<ListItem> = self
                .session
                .media()
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let color = match item.kind {
                        MediaKind::Image => Color::Green,
                        MediaKind::Video => Color::Magenta,
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{:>2}. ", i + 1)),
                        Span::styled(format!("{:<6}", item.kind.label()), Style::default().fg(color)),
                        Span::styled(item.uri.clone(), Style::default().fg(Color::Gray)),
                    ]))
                })
                .collect();
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                )
                .highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, chunks[2], &mut self.media_state);
        }

        if let Some(prompt) = self.import_path.as_mut() {
            let block = Block::default()
                .title(" Importar arquivo ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan));
            let prompt_area = block.inner(chunks[3]);
            frame.render_widget(block, chunks[3]);
            prompt.render(frame, prompt_area, true);
            frame.render_widget(
                footer(&[("Enter", "anexar"), ("Esc", "cancelar")]),
                chunks[4],
            );
            return;
        }

        let hints: &[(&str, &str)] = if recording.is_some() {
            &[("s", "parar gravação")]
        } else if self.session.media().is_empty() {
            &[
                ("f", "foto"),
                ("v", "vídeo"),
                ("i", "importar"),
                ("Esc", "voltar"),
            ]
        } else {
            &[
                ("f", "foto"),
                ("v", "vídeo"),
                ("i", "importar"),
                ("d", "remover"),
                ("Enter", "Próximo"),
                ("Esc", "voltar"),
            ]
        };
        frame.render_widget(footer(hints), chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_millis(61_500)), "01:01");
    }
}
