//! Application event loop and screen layout.

use crate::client::{CompletionClient, SENTINEL};
use crate::config::Config;
use crate::conversation::{Conversation, Turn};
use crate::ui::commands::{get_help_text, SlashCommand};
use crate::ui::composer::{Composer, ComposerResult};
use crate::ui::history::HistoryView;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc;

/// A completion call in flight. The question is held here until the call
/// resolves; only then is the turn appended to the conversation.
struct PendingCall {
    question: String,
    rx: mpsc::Receiver<String>,
}

/// Single-session chat console application
pub struct ChatApp {
    client: CompletionClient,
    conversation: Conversation,
    composer: Composer,
    pending: Option<PendingCall>,
    notice: Option<String>,
    should_exit: bool,
}

impl ChatApp {
    pub fn new(config: Config) -> Self {
        Self {
            client: CompletionClient::new(config),
            conversation: Conversation::new(),
            composer: Composer::new("Enter text here".to_string()),
            pending: None,
            notice: None,
            should_exit: false,
        }
    }

    /// Run the console until the user exits.
    pub async fn run(mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            self.poll_pending();
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            if self.should_exit {
                return Ok(());
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let size = frame.size();
        // Inner width, inside the composer borders
        let composer_width = size.width.saturating_sub(2);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(self.composer.desired_height(composer_width)),
            ])
            .split(size);

        let app_bar = Line::from(vec![
            Span::styled(" askr ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("— chat console   "),
            Span::styled(
                format!("model: {}", self.client.model()),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(app_bar).style(Style::default().fg(Color::White).bg(Color::Blue)),
            chunks[0],
        );

        let history = HistoryView::new(&self.conversation)
            .pending_question(self.pending.as_ref().map(|p| p.question.as_str()))
            .notice(self.notice.as_deref());
        frame.render_widget(history, chunks[1]);

        frame.render_widget(self.composer.clone(), chunks[2]);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.should_exit = true;
            return;
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submitted(input) => {
                self.notice = None;
                self.submit(input);
            }
            ComposerResult::Command(SlashCommand::Help) => {
                self.notice = Some(get_help_text());
            }
            ComposerResult::Command(SlashCommand::Bye) => {
                self.should_exit = true;
            }
            ComposerResult::None => {}
        }
    }

    /// Issue a completion call for the submitted input. The call runs on a
    /// spawned task and reports back over a channel; the pending flag keeps
    /// a second submit from starting while this one is in flight.
    fn submit(&mut self, input: String) {
        if self.pending.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel(1);
        let client = self.client.clone();
        let prior: Vec<Turn> = self.conversation.turns().to_vec();
        let question = input.clone();

        tokio::spawn(async move {
            let answer = client.complete_or_sentinel(&input, &prior).await;
            let _ = tx.send(answer).await;
        });

        self.pending = Some(PendingCall { question, rx });
        self.composer.set_pending(true);
    }

    /// Check whether the in-flight call has resolved; if so, append the
    /// completed turn. The conversation is only ever mutated here.
    fn poll_pending(&mut self) {
        let Some(pending) = &mut self.pending else {
            return;
        };

        let answer = match pending.rx.try_recv() {
            Ok(answer) => answer,
            Err(mpsc::error::TryRecvError::Empty) => return,
            // The task went away without reporting; treat it like any
            // other failure.
            Err(mpsc::error::TryRecvError::Disconnected) => SENTINEL.to_string(),
        };

        let question = std::mem::take(&mut pending.question);
        self.conversation.append(Turn::new(question, answer));
        self.pending = None;
        self.composer.set_pending(false);
    }
}
