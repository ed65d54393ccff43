//! Multi-line input composer for the chat console.

use crate::ui::commands::{parse_slash_command, SlashCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerResult {
    Submitted(String),
    Command(SlashCommand),
    None,
}

/// State for the text area within the composer. The cursor is a character
/// position, not a byte offset.
#[derive(Debug, Clone, Default)]
struct TextAreaState {
    content: String,
    cursor: usize,
}

impl TextAreaState {
    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Composer for user input. While a completion call is pending the submit
/// action is disabled and the title becomes a progress indicator.
#[derive(Clone)]
pub struct Composer {
    state: TextAreaState,
    placeholder: String,
    pending: bool,
}

impl Composer {
    pub fn new(placeholder: String) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder,
            pending: false,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.insert_char('\n');
                } else if !self.pending && !self.state.content.trim().is_empty() {
                    let content = std::mem::take(&mut self.state.content);
                    self.state.cursor = 0;
                    if let Some(command) = parse_slash_command(&content) {
                        return ComposerResult::Command(command);
                    }
                    return ComposerResult::Submitted(content);
                }
            }
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => {
                if self.state.cursor > 0 {
                    self.state.cursor -= 1;
                    let index = self.state.byte_index();
                    self.state.content.remove(index);
                }
            }
            KeyCode::Delete => {
                if self.state.cursor < self.state.char_count() {
                    let index = self.state.byte_index();
                    self.state.content.remove(index);
                }
            }
            KeyCode::Left => {
                self.state.cursor = self.state.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.state.cursor < self.state.char_count() {
                    self.state.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.state.cursor = 0;
            }
            KeyCode::End => {
                self.state.cursor = self.state.char_count();
            }
            _ => {}
        }

        ComposerResult::None
    }

    fn insert_char(&mut self, c: char) {
        let index = self.state.byte_index();
        self.state.content.insert(index, c);
        self.state.cursor += 1;
    }

    /// Set whether a completion call is in flight
    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    /// Height the composer wants for the given inner width, including its
    /// borders. Grows with the entered text, counting soft-wrapped rows,
    /// clamped so the history keeps most of the screen.
    pub fn desired_height(&self, width: u16) -> u16 {
        let width = width.max(1) as usize;
        let rows: usize = self
            .state
            .content
            .split('\n')
            .map(|line| soft_wrap(line, width).len())
            .sum();
        rows.clamp(3, 8) as u16 + 2
    }
}

/// Break one hard line into width-sized display rows.
fn soft_wrap(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

impl Widget for Composer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, border_style) = if self.pending {
            (
                " Waiting for response… ",
                Style::default().fg(Color::Yellow),
            )
        } else {
            (
                " Ask anything — Enter to send, Shift+Enter for a new line ",
                Style::default().fg(Color::Green),
            )
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                &self.placeholder,
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content = self.state.content.clone();
            if !self.pending {
                content.insert(self.state.byte_index(), '▌');
            }

            // Same wrapping as desired_height so every row stays visible
            let width = inner_area.width.max(1) as usize;
            let rows: Vec<String> = content
                .split('\n')
                .flat_map(|line_text| soft_wrap(line_text, width))
                .collect();

            for (i, row) in rows.iter().enumerate() {
                if i < inner_area.height as usize {
                    let line = Line::from(vec![Span::raw(row.as_str())]);
                    buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_submits_typed_text() {
        let mut composer = Composer::new(String::new());
        type_text(&mut composer, "hello");

        let result = composer.handle_key(press(KeyCode::Enter));
        assert_eq!(result, ComposerResult::Submitted("hello".to_string()));

        // Content is cleared after submit
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerResult::None);
    }

    #[test]
    fn shift_enter_inserts_newline_instead_of_submitting() {
        let mut composer = Composer::new(String::new());
        type_text(&mut composer, "line one");

        let result = composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        assert_eq!(result, ComposerResult::None);

        type_text(&mut composer, "line two");
        let result = composer.handle_key(press(KeyCode::Enter));
        assert_eq!(
            result,
            ComposerResult::Submitted("line one\nline two".to_string())
        );
    }

    #[test]
    fn submit_is_disabled_while_pending() {
        let mut composer = Composer::new(String::new());
        type_text(&mut composer, "hello");
        composer.set_pending(true);

        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerResult::None);

        composer.set_pending(false);
        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Submitted("hello".to_string())
        );
    }

    #[test]
    fn blank_input_is_not_submitted() {
        let mut composer = Composer::new(String::new());
        type_text(&mut composer, "   ");
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerResult::None);
    }

    #[test]
    fn slash_input_becomes_a_command() {
        let mut composer = Composer::new(String::new());
        type_text(&mut composer, "/bye");
        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Command(SlashCommand::Bye)
        );
    }

    #[test]
    fn cursor_editing_is_character_safe() {
        let mut composer = Composer::new(String::new());
        type_text(&mut composer, "héllo");

        composer.handle_key(press(KeyCode::Left));
        composer.handle_key(press(KeyCode::Left));
        composer.handle_key(press(KeyCode::Backspace));
        type_text(&mut composer, "L");

        let result = composer.handle_key(press(KeyCode::End));
        assert_eq!(result, ComposerResult::None);
        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Submitted("héLlo".to_string())
        );
    }

    #[test]
    fn composer_height_grows_with_content() {
        let mut composer = Composer::new(String::new());
        assert_eq!(composer.desired_height(80), 5);

        for _ in 0..10 {
            type_text(&mut composer, "line");
            composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        }
        assert_eq!(composer.desired_height(80), 10);
    }

    #[test]
    fn composer_height_counts_soft_wrapped_rows() {
        let mut composer = Composer::new(String::new());
        assert_eq!(composer.desired_height(10), 5);

        // One long line: 45 chars wrap to 5 rows at width 10
        type_text(&mut composer, &"x".repeat(45));
        assert_eq!(composer.desired_height(10), 7);

        // Keeps growing until the clamp
        type_text(&mut composer, &"x".repeat(100));
        assert_eq!(composer.desired_height(10), 10);
    }
}
