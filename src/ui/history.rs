//! Scrolling question/answer history display.

use crate::conversation::{Conversation, Turn};
use crate::render::{render, Segment};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// History display for the current conversation. Shows the in-flight
/// question with a thinking indicator while a completion call is pending.
pub struct HistoryView<'a> {
    conversation: &'a Conversation,
    pending_question: Option<&'a str>,
    notice: Option<&'a str>,
}

impl<'a> HistoryView<'a> {
    pub fn new(conversation: &'a Conversation) -> Self {
        Self {
            conversation,
            pending_question: None,
            notice: None,
        }
    }

    /// Question currently awaiting an answer, if any
    pub fn pending_question(mut self, question: Option<&'a str>) -> Self {
        self.pending_question = question;
        self
    }

    /// Transient system notice shown after the history
    pub fn notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(" Conversation ");
        let inner_area = block.inner(area);
        block.render(area, buf);

        let width = inner_area.width;

        if self.conversation.is_empty() && self.pending_question.is_none() {
            let mut welcome_lines = vec![
                Line::from(vec![Span::styled(
                    "The AI will respond to your questions.",
                    Style::default().fg(Color::Gray),
                )]),
                Line::from(vec![Span::raw("")]),
                Line::from(vec![Span::styled(
                    "Type below and press Enter to send. /help lists commands.",
                    Style::default().fg(Color::DarkGray),
                )]),
            ];

            // A notice is still shown before the first turn exists
            if let Some(notice) = self.notice {
                welcome_lines.push(Line::from(vec![Span::raw("")]));
                welcome_lines.append(&mut notice_lines(notice, width));
            }

            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();

        for (index, turn) in self.conversation.turns().iter().enumerate() {
            all_lines.append(&mut turn_lines(turn, index, width));
            all_lines.push(Line::from(vec![Span::raw("")]));
        }

        if let Some(question) = self.pending_question {
            let number = self.conversation.len() + 1;
            all_lines.append(&mut question_lines(question, number, chrono::Utc::now(), width));
            all_lines.push(thinking_line());
        }

        if let Some(notice) = self.notice {
            all_lines.append(&mut notice_lines(notice, width));
        }

        // Bottom-anchored: show the tail that fits
        let height = inner_area.height as usize;
        let start = all_lines.len().saturating_sub(height);
        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Lines for one completed turn: the question, then the answer with fenced
/// code regions rendered as distinct blocks.
fn turn_lines(turn: &Turn, index: usize, width: u16) -> Vec<Line<'static>> {
    let mut lines = question_lines(&turn.question, index + 1, turn.asked_at, width);

    let header = format!("A{}. {}", index + 1, "─".repeat(20));
    lines.push(Line::from(vec![Span::styled(
        header,
        Style::default().fg(Color::DarkGray),
    )]));

    for segment in render(&turn.answer) {
        match segment {
            Segment::Text(text) => {
                for wrapped in wrap_text(&text, width.saturating_sub(2) as usize) {
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(wrapped, Style::default().fg(Color::Green)),
                    ]));
                }
            }
            Segment::Code(code) => {
                // Preformatted block: keep line breaks, distinct colors
                for code_line in code.split('\n') {
                    lines.push(Line::from(vec![
                        Span::raw("    "),
                        Span::styled(
                            code_line.to_string(),
                            Style::default().fg(Color::White).bg(Color::Black),
                        ),
                    ]));
                }
            }
        }
    }

    lines
}

fn question_lines(
    question: &str,
    number: usize,
    asked_at: chrono::DateTime<chrono::Utc>,
    width: u16,
) -> Vec<Line<'static>> {
    let header = format!(
        "Q{}. {} {}",
        number,
        asked_at.format("%H:%M:%S"),
        "─".repeat(20)
    );

    let mut lines = vec![Line::from(vec![Span::styled(
        header,
        Style::default().fg(Color::DarkGray),
    )])];

    for wrapped in wrap_text(question, width.saturating_sub(2) as usize) {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(wrapped, Style::default().fg(Color::Blue)),
        ]));
    }

    lines
}

fn notice_lines(notice: &str, width: u16) -> Vec<Line<'static>> {
    wrap_text(notice, width.saturating_sub(2) as usize)
        .into_iter()
        .map(|text| {
            Line::from(vec![
                Span::raw("  "),
                Span::styled(text, Style::default().fg(Color::Yellow)),
            ])
        })
        .collect()
}

fn thinking_line() -> Line<'static> {
    let dots = match (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 300)
        % 4
    {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "   ",
    };

    Line::from(vec![
        Span::raw("  "),
        Span::styled("thinking", Style::default().fg(Color::Green)),
        Span::styled(dots, Style::default().fg(Color::Yellow)),
    ])
}

/// Wrap text to fit within the given width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 <= width {
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        } else {
            if !current_line.is_empty() {
                lines.push(current_line);
                current_line = String::new();
            }
            current_line.push_str(word);
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_text_splits_on_word_boundaries() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn wrap_text_handles_empty_input() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn notice_shows_on_a_fresh_session() {
        let conversation = Conversation::new();
        let view = HistoryView::new(&conversation).notice(Some("Available commands: /help /bye"));

        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Available commands"));
    }

    #[test]
    fn notice_shows_after_turns_exist() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::new("hi".to_string(), "hello".to_string()));
        let view = HistoryView::new(&conversation).notice(Some("Available commands: /help /bye"));

        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);

        assert!(buffer_text(&buf).contains("Available commands"));
    }

    #[test]
    fn answer_with_fence_produces_code_styled_lines() {
        let turn = Turn::new(
            "show me".to_string(),
            "here:```let x = 1;\nlet y = 2;```done".to_string(),
        );
        let lines = turn_lines(&turn, 0, 40);
        let flattened: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        assert!(flattened.iter().any(|l| l.contains("let x = 1;")));
        assert!(flattened.iter().any(|l| l.contains("let y = 2;")));
        assert!(flattened.iter().any(|l| l.contains("done")));
    }
}
