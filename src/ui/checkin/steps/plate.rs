//! Step 1: plate lookup, customer data and handover

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{footer, label_style, section_title, step_block};
use crate::checkin::{CustomerData, VehicleData};
use crate::ui::checkin::{CheckInScreen, PlateFocus};

fn customer_lines(vehicle: &VehicleData) -> Vec<Line<'static>> {
    let row = |label: &str, value: &str| {
        let value = if value.trim().is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        };
        Line::from(vec![
            Span::styled(format!("{:<10}", label), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ])
    };

    let mut lines = Vec::new();
    let description = vehicle.description();
    if !description.is_empty() {
        lines.push(row("Veículo", &description));
    }
    match &vehicle.customer {
        Some(CustomerData {
            name,
            phone,
            email,
            address,
            ..
        }) => {
            lines.push(row("Nome", name));
            lines.push(row("Telefone", phone));
            lines.push(row("E-mail", email));
            lines.push(row("Endereço", address));
        }
        None => lines.push(Line::from(Span::styled(
            "Cliente não vinculado a este veículo",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    lines
}

impl CheckInScreen {
    pub(crate) fn render_plate_step(&mut self, frame: &mut Frame, area: Rect) {
        let inner = step_block(frame, area, self.step());
        let show_handover = self.handover.is_on();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Subtitle
                Constraint::Length(1), // Spacer
                Constraint::Length(1), // Plate label
                Constraint::Length(1), // Plate input
                Constraint::Length(1), // Status
                Constraint::Length(1), // Spacer
                Constraint::Min(6),    // Customer
                Constraint::Length(if show_handover { 6 } else { 2 }), // Handover
                Constraint::Length(1), // Footer
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new("Digite a placa do veículo para iniciar o check-in")
                .style(Style::default().fg(Color::Gray)),
            chunks[0],
        );

        let focus = self.plate_focus;
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Placa do Veículo",
                label_style(focus == PlateFocus::Plate),
            )),
            chunks[2],
        );
        self.plate
            .render(frame, chunks[3], focus == PlateFocus::Plate);

        let lookup = self.session.lookup();
        let status = if lookup.is_in_flight() {
            Span::styled("Buscando veículo...", Style::default().fg(Color::Yellow))
        } else if let Some(vehicle) = lookup.vehicle() {
            Span::styled(
                format!("Veículo {} carregado", vehicle.plate),
                Style::default().fg(Color::Green),
            )
        } else {
            Span::styled(
                "Enter para buscar",
                Style::default().fg(Color::DarkGray),
            )
        };
        frame.render_widget(Paragraph::new(status), chunks[4]);

        let found = lookup.vehicle().cloned();
        if let Some(vehicle) = &found {
            let customer_area = chunks[6];
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(customer_area);
            frame.render_widget(section_title("Dados do Cliente"), parts[0]);
            frame.render_widget(Paragraph::new(customer_lines(vehicle)), parts[1]);

            let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
            if show_handover {
                constraints.extend([Constraint::Length(1); 4]);
            }
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(chunks[7]);

            frame.render_widget(
                Paragraph::new(Span::styled(
                    "Outra pessoa entregando o carro",
                    label_style(focus == PlateFocus::Handover),
                )),
                rows[0],
            );
            self.handover
                .render(frame, rows[1], focus == PlateFocus::Handover);

            if show_handover {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        "Nome do Responsável",
                        label_style(focus == PlateFocus::ResponsibleName),
                    )),
                    rows[2],
                );
                self.responsible_name.render(
                    frame,
                    rows[3],
                    focus == PlateFocus::ResponsibleName,
                );
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        "Telefone do Responsável",
                        label_style(focus == PlateFocus::ResponsiblePhone),
                    )),
                    rows[4],
                );
                self.responsible_phone.render(
                    frame,
                    rows[5],
                    focus == PlateFocus::ResponsiblePhone,
                );
            }
        }

        let hints: &[(&str, &str)] = if self.can_leave_plate_step() {
            &[
                ("Enter", "buscar/avançar"),
                ("Tab", "próximo campo"),
                ("PgDn", "Avançar"),
                ("Esc", "sair"),
            ]
        } else {
            &[("Enter", "buscar"), ("Esc", "sair")]
        };
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(10)])
            .split(chunks[8]);
        frame.render_widget(footer(hints), bottom[0]);

        if found.is_some() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " Avançar ",
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                )),
                bottom[1],
            );
        }
    }
}
