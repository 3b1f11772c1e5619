//! Step 7: review and submit

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::{footer, section_title, step_block};
use crate::checkin::{CheckInRecord, MediaKind};
use crate::ui::checkin::CheckInScreen;

/// Review lines for an assembled record
pub(crate) fn summary_lines(record: &CheckInRecord) -> Vec<Line<'static>> {
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<14}", label), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ])
    };

    let mut lines = vec![row("Placa", record.vehicle.plate.clone())];
    let description = record.vehicle.description();
    if !description.is_empty() {
        lines.push(row("Veículo", description));
    }
    if let Some(customer) = &record.vehicle.customer {
        lines.push(row("Cliente", customer.name.clone()));
    }
    if let Some(handover) = record.handover.as_ref().filter(|h| h.other_person_delivering) {
        lines.push(row(
            "Entregue por",
            format!("{} ({})", handover.responsible_name, handover.responsible_phone),
        ));
    }

    let photos = record
        .media
        .iter()
        .filter(|m| m.kind == MediaKind::Image)
        .count();
    lines.push(row(
        "Mídia",
        format!(
            "{} foto(s), {} vídeo(s)",
            photos,
            record.media.len() - photos
        ),
    ));
    lines.push(row(
        "Combustível",
        record.fuel_and_items.fuel_level.label().to_string(),
    ));
    let note = record.fuel_and_items.personal_items_note.trim();
    lines.push(row(
        "Objetos",
        if note.is_empty() {
            "Nenhum".to_string()
        } else {
            note.replace('\n', "; ")
        },
    ));
    lines
}

impl CheckInScreen {
    pub(crate) fn render_finish_step(&mut self, frame: &mut Frame, area: Rect) {
        let inner = step_block(frame, area, self.step());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(4),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(section_title(self.step().heading()), chunks[0]);

        match self.session.assemble() {
            Ok(record) => {
                frame.render_widget(
                    Paragraph::new(summary_lines(&record)).wrap(Wrap { trim: false }),
                    chunks[2],
                );
                let button = if self.submitting {
                    " Enviando... "
                } else {
                    " Finalizar check-in "
                };
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        button,
                        Style::default()
                            .fg(Color::Black)
                            .bg(if self.submitting {
                                Color::DarkGray
                            } else {
                                Color::Green
                            })
                            .add_modifier(Modifier::BOLD),
                    )),
                    chunks[3],
                );
            }
            Err(err) => {
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from(Span::styled(
                            err.title(),
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        )),
                        Line::from(err.to_string()),
                    ])
                    .wrap(Wrap { trim: true }),
                    chunks[2],
                );
            }
        }

        frame.render_widget(
            footer(&[("Enter", "finalizar"), ("Esc", "voltar")]),
            chunks[4],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::{FuelAndItemsData, FuelLevel, HandoverData, MediaItem, VehicleData};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_summary_lines() {
        let record = CheckInRecord {
            id: Uuid::new_v4(),
            vehicle: VehicleData {
                id: "v1".to_string(),
                plate: "ABC1234".to_string(),
                brand: Some("Fiat".to_string()),
                model: Some("Uno".to_string()),
                year: None,
                color: None,
                customer_id: "c1".to_string(),
                customer: None,
            },
            media: vec![MediaItem::image("file:///a.jpg"), MediaItem::video("file:///b.mp4")],
            handover: Some(HandoverData::default()),
            fuel_and_items: FuelAndItemsData {
                personal_items_note: "chave reserva".to_string(),
                fuel_level: FuelLevel::new(2),
            },
            started_at: Utc::now(),
            completed_at: Utc::now(),
        };

        let text: Vec<String> = summary_lines(&record)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        assert_eq!(text[0], format!("{:<14}ABC1234", "Placa"));
        assert!(text.iter().any(|l| l.ends_with("Fiat Uno")));
        assert!(text.iter().any(|l| l.ends_with("1 foto(s), 1 vídeo(s)")));
        assert!(text.iter().any(|l| l.ends_with("1/2")));
        assert!(!text.iter().any(|l| l.starts_with("Entregue por")));
    }
}
