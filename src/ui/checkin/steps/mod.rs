//! Per-step rendering for the check-in screen

mod finish;
mod fuel;
mod media;
mod pending;
mod plate;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::checkin::CheckInStep;

/// Outer block with the step title and progress; returns the inner area
pub(crate) fn step_block(frame: &mut Frame, area: Rect, step: CheckInStep) -> Rect {
    let total = CheckInStep::all().len();
    let progress: String = (1..=total)
        .map(|n| if n <= step.number() { '●' } else { '○' })
        .collect();

    let block = Block::default()
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                step.title(),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ]))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", progress),
            Style::default().fg(Color::DarkGray),
        )))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Key hint line: pairs of (key, description)
pub(crate) fn footer(hints: &[(&str, &str)]) -> Paragraph<'static> {
    let mut spans = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw(format!(" {}", desc)));
    }
    Paragraph::new(Line::from(spans))
}

pub(crate) fn section_title(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(
        text,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

pub(crate) fn label_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}
