//! In-memory conversation store for a single chat session.

use chrono::{DateTime, Utc};

/// One question/answer exchange. Immutable once appended to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(question: String, answer: String) -> Self {
        Self {
            question,
            answer,
            asked_at: Utc::now(),
        }
    }
}

/// Ordered, append-only log of turns. Lives for the session only; there is
/// no persistence and no delete or update.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed turn to the end of the log.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in chronological order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(q: &str, a: &str) -> Turn {
        Turn::new(q.to_string(), a.to_string())
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut conversation = Conversation::new();
        conversation.append(turn("first", "one"));
        conversation.append(turn("second", "two"));
        conversation.append(turn("third", "three"));

        let questions: Vec<&str> = conversation
            .turns()
            .iter()
            .map(|t| t.question.as_str())
            .collect();
        assert_eq!(questions, vec!["first", "second", "third"]);
    }

    #[test]
    fn append_leaves_prior_turns_unchanged() {
        let mut conversation = Conversation::new();
        conversation.append(turn("q1", "a1"));
        let before = conversation.turns()[0].clone();

        conversation.append(turn("q2", "a2"));
        assert_eq!(conversation.turns()[0], before);
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn starts_empty() {
        let conversation = Conversation::new();
        assert!(conversation.is_empty());
        assert_eq!(conversation.len(), 0);
    }
}
