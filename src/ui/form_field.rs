//! Reusable form field widgets for TUI forms

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

/// A form field widget that can handle different input types
pub enum FormField {
    /// Single-line text input
    TextInput {
        value: String,
        /// Cursor position in characters, not bytes
        cursor_pos: usize,
        placeholder: String,
        max_length: Option<usize>,
        /// Render as bullets (passwords)
        masked: bool,
        /// Upper-case characters as they are typed (plates)
        uppercase: bool,
    },
    /// Multi-line text input using tui-textarea
    TextArea {
        textarea: Box<TextArea<'static>>,
        placeholder: String,
    },
    /// Boolean switch
    Toggle {
        value: bool,
        true_label: String,
        false_label: String,
    },
}

fn byte_index(value: &str, char_pos: usize) -> usize {
    value
        .char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

impl FormField {
    pub fn text(placeholder: &str) -> Self {
        FormField::TextInput {
            value: String::new(),
            cursor_pos: 0,
            placeholder: placeholder.to_string(),
            max_length: None,
            masked: false,
            uppercase: false,
        }
    }

    pub fn password(placeholder: &str, masked: bool) -> Self {
        FormField::TextInput {
            value: String::new(),
            cursor_pos: 0,
            placeholder: placeholder.to_string(),
            max_length: None,
            masked,
            uppercase: false,
        }
    }

    /// Upper-cased input capped at `max_length` characters
    pub fn code(placeholder: &str, max_length: usize) -> Self {
        FormField::TextInput {
            value: String::new(),
            cursor_pos: 0,
            placeholder: placeholder.to_string(),
            max_length: Some(max_length),
            masked: false,
            uppercase: true,
        }
    }

    pub fn text_area(placeholder: &str) -> Self {
        FormField::TextArea {
            textarea: Box::new(TextArea::default()),
            placeholder: placeholder.to_string(),
        }
    }

    pub fn toggle(value: bool, true_label: &str, false_label: &str) -> Self {
        FormField::Toggle {
            value,
            true_label: true_label.to_string(),
            false_label: false_label.to_string(),
        }
    }

    /// Get the current value as a string
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::TextArea { textarea, .. } => textarea.lines().join("\n"),
            FormField::Toggle { value, .. } => value.to_string(),
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, FormField::Toggle { value: true, .. })
    }

    /// Set the value from a string
    pub fn set_value(&mut self, new_value: &str) {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                max_length,
                uppercase,
                ..
            } => {
                let mut text: String = if *uppercase {
                    new_value.to_uppercase()
                } else {
                    new_value.to_string()
                };
                if let Some(max) = max_length {
                    text = text.chars().take(*max).collect();
                }
                *cursor_pos = text.chars().count();
                *value = text;
            }
            FormField::TextArea { textarea, .. } => {
                textarea.select_all();
                textarea.cut();
                textarea.insert_str(new_value);
            }
            FormField::Toggle { value, .. } => {
                *value = new_value == "true";
            }
        }
    }

    pub fn clear(&mut self) {
        self.set_value(match self {
            FormField::Toggle { .. } => "false",
            _ => "",
        });
    }

    /// Handle a key event, returns true if the key changed or was consumed by the field
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                max_length,
                uppercase,
                ..
            } => {
                let len = value.chars().count();
                match key {
                    KeyCode::Char(c) => {
                        if max_length.map(|m| len < m).unwrap_or(true) {
                            let at = byte_index(value, *cursor_pos);
                            if *uppercase {
                                let upper: String = c.to_uppercase().collect();
                                value.insert_str(at, &upper);
                            } else {
                                value.insert(at, c);
                            }
                            *cursor_pos += 1;
                        }
                        true
                    }
                    KeyCode::Backspace => {
                        if *cursor_pos > 0 {
                            *cursor_pos -= 1;
                            value.remove(byte_index(value, *cursor_pos));
                        }
                        true
                    }
                    KeyCode::Delete => {
                        if *cursor_pos < len {
                            value.remove(byte_index(value, *cursor_pos));
                        }
                        true
                    }
                    KeyCode::Left => {
                        *cursor_pos = cursor_pos.saturating_sub(1);
                        true
                    }
                    KeyCode::Right => {
                        if *cursor_pos < len {
                            *cursor_pos += 1;
                        }
                        true
                    }
                    KeyCode::Home => {
                        *cursor_pos = 0;
                        true
                    }
                    KeyCode::End => {
                        *cursor_pos = len;
                        true
                    }
                    _ => false,
                }
            }
            FormField::TextArea { textarea, .. } => {
                // TextArea handles its own key events
                textarea.input(crossterm::event::KeyEvent::new(
                    key,
                    crossterm::event::KeyModifiers::NONE,
                ));
                true
            }
            FormField::Toggle { value, .. } => match key {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    *value = !*value;
                    true
                }
                KeyCode::Left => {
                    *value = false;
                    true
                }
                KeyCode::Right => {
                    *value = true;
                    true
                }
                _ => false,
            },
        }
    }

    /// Get the height needed to render this field
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextInput { .. } => 1,
            FormField::TextArea { .. } => 5,
            FormField::Toggle { .. } => 1,
        }
    }

    /// Render the field
    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_color = if focused { Color::Cyan } else { Color::Gray };

        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                placeholder,
                max_length,
                masked,
                ..
            } => {
                if value.is_empty() && !focused {
                    let para = Paragraph::new(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ));
                    frame.render_widget(para, area);
                    return;
                }

                let mut text: String = if *masked {
                    "•".repeat(value.chars().count())
                } else {
                    value.clone()
                };
                if focused {
                    text.insert(byte_index(&text, *cursor_pos), '|');
                }

                let suffix = max_length
                    .map(|m| format!(" ({}/{})", value.chars().count(), m))
                    .unwrap_or_default();

                let para = Paragraph::new(Line::from(vec![
                    Span::raw(text),
                    Span::styled(suffix, Style::default().fg(Color::DarkGray)),
                ]))
                .style(Style::default().fg(if focused {
                    Color::White
                } else {
                    Color::Gray
                }));
                frame.render_widget(para, area);
            }
            FormField::TextArea {
                textarea,
                placeholder,
            } => {
                textarea.set_cursor_line_style(Style::default());
                textarea.set_cursor_style(if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                });
                textarea.set_block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border_color)),
                );
                textarea.set_placeholder_text(placeholder.clone());
                textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));

                frame.render_widget(&**textarea, area);
            }
            FormField::Toggle {
                value,
                true_label,
                false_label,
            } => {
                let on_style = if *value {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let off_style = if !*value {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };

                let line = Line::from(vec![
                    Span::styled(format!("[{}]", true_label), on_style),
                    Span::raw(" / "),
                    Span::styled(format!("[{}]", false_label), off_style),
                ]);

                frame.render_widget(Paragraph::new(line), area);
            }
        }
    }
}
