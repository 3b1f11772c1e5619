//! Transient notifications drawn in the top-right corner

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const MAX_VISIBLE: usize = 3;
const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    fn color(&self) -> Color {
        match self {
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
            ToastKind::Info => Color::Cyan,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    shown_at: Instant,
}

/// Queue of toasts; each one disappears after `ttl`
pub struct Toasts {
    items: VecDeque<Toast>,
    ttl: Duration,
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, kind: ToastKind, title: impl Into<String>, message: impl Into<String>) {
        let toast = Toast {
            kind,
            title: title.into(),
            message: message.into(),
            shown_at: Instant::now(),
        };
        tracing::debug!(title = %toast.title, message = %toast.message, "Toast");
        self.items.push_back(toast);
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    pub fn success(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(ToastKind::Success, title, message);
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(ToastKind::Error, title, message);
    }

    pub fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(ToastKind::Info, title, message);
    }

    /// Drop toasts older than the ttl
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|t| now.saturating_duration_since(t.shown_at) < ttl);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.back()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn render(&self, frame: &mut Frame) {
        let screen = frame.area();
        let width = TOAST_WIDTH.min(screen.width);
        for (i, toast) in self.items.iter().rev().enumerate() {
            let y = screen.y + 1 + i as u16 * TOAST_HEIGHT;
            if y + TOAST_HEIGHT > screen.bottom() {
                break;
            }
            let area = Rect::new(screen.right().saturating_sub(width + 1), y, width, TOAST_HEIGHT);
            frame.render_widget(Clear, area);

            let color = toast.kind.color();
            let block = Block::default()
                .title(Span::styled(
                    format!(" {} ", toast.title),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color));
            frame.render_widget(
                Paragraph::new(Line::from(toast.message.as_str()))
                    .wrap(Wrap { trim: true })
                    .block(block),
                area,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_latest() {
        let mut toasts = Toasts::new(Duration::from_secs(4));
        for i in 0..5 {
            toasts.info("t", format!("m{}", i));
        }
        assert_eq!(toasts.iter().count(), MAX_VISIBLE);
        assert_eq!(toasts.latest().unwrap().message, "m4");
    }

    #[test]
    fn test_expire() {
        let mut toasts = Toasts::new(Duration::from_secs(4));
        toasts.error("Erro na busca", "timeout");
        toasts.expire(Instant::now());
        assert!(!toasts.is_empty());

        toasts.expire(Instant::now() + Duration::from_secs(5));
        assert!(toasts.is_empty());
    }
}
