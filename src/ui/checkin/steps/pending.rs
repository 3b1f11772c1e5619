//! Steps 4 to 6 collect nothing yet

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use super::{footer, section_title, step_block};
use crate::ui::checkin::CheckInScreen;

impl CheckInScreen {
    pub(crate) fn render_pending_step(&mut self, frame: &mut Frame, area: Rect) {
        let inner = step_block(frame, area, self.step());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(section_title(self.step().heading()), chunks[0]);
        frame.render_widget(
            Paragraph::new("Nenhuma informação necessária nesta etapa.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            chunks[1],
        );
        frame.render_widget(
            footer(&[("Enter", "Próximo"), ("Esc", "voltar")]),
            chunks[2],
        );
    }
}
