//! Step 3: personal items and fuel level

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Wrap},
    Frame,
};

use super::{footer, label_style, section_title, step_block};
use crate::checkin::FuelLevel;
use crate::ui::checkin::{CheckInScreen, FuelFocus};

/// Tick marks under the gauge, current level highlighted
fn level_marks(current: FuelLevel) -> Line<'static> {
    let spans = FuelLevel::LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let style = if i == usize::from(current.value()) {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("{:<8}", label), style)
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

impl CheckInScreen {
    pub(crate) fn render_fuel_step(&mut self, frame: &mut Frame, area: Rect) {
        let inner = step_block(frame, area, self.step());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(2), // Description
                Constraint::Length(1), // Items label
                Constraint::Min(5),    // Items textarea
                Constraint::Length(1), // Spacer
                Constraint::Length(1), // Fuel label
                Constraint::Length(1), // Gauge
                Constraint::Length(1), // Marks
                Constraint::Length(1), // Footer
            ])
            .split(inner);

        frame.render_widget(section_title("Detalhes finais"), chunks[0]);
        frame.render_widget(
            Paragraph::new(
                "Para fechar a entrada do automóvel em sua oficina, preencha as informações abaixo.",
            )
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true }),
            chunks[1],
        );

        let note_focused = self.fuel_focus == FuelFocus::Note;
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Tem objetos pessoais no interior?",
                label_style(note_focused),
            )),
            chunks[2],
        );
        self.items_note.render(frame, chunks[3], note_focused);

        let fuel_focused = self.fuel_focus == FuelFocus::Fuel;
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Quanto de combustível tem no tanque?",
                label_style(fuel_focused),
            )),
            chunks[5],
        );
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(if fuel_focused {
                Color::Cyan
            } else {
                Color::Blue
            }))
            .ratio(self.fuel_level.ratio())
            .label(self.fuel_level.label());
        frame.render_widget(gauge, chunks[6]);
        frame.render_widget(Paragraph::new(level_marks(self.fuel_level)), chunks[7]);

        let hints: &[(&str, &str)] = if fuel_focused {
            &[
                ("←/→", "nível"),
                ("0-4", "definir"),
                ("Tab", "objetos"),
                ("Enter", "Próximo"),
                ("Esc", "voltar"),
            ]
        } else {
            &[("Tab", "combustível"), ("PgDn", "Próximo"), ("Esc", "voltar")]
        };
        frame.render_widget(footer(hints), chunks[8]);
    }
}
