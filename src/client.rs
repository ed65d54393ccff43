//! Client for the remote chat-completion endpoint.
//!
//! Each call replays the full conversation as context: every prior turn
//! becomes a user/assistant message pair, followed by one trailing user
//! message with the new input. Failures never escape `complete_or_sentinel`;
//! they are logged and collapsed to the literal sentinel `"error"`, which
//! callers append to the conversation like any other answer.

use crate::config::Config;
use crate::conversation::Turn;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Duration;

/// Placeholder answer recorded when a completion call fails for any reason.
pub const SENTINEL: &str = "error";

/// Failure taxonomy for a completion call. All three collapse to the
/// sentinel on the compatibility path.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Connection, IO, or non-auth HTTP failure
    #[error("transport failure: {0}")]
    Transport(String),
    /// Missing or rejected credential
    #[error("authentication failure: {0}")]
    Auth(String),
    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    Shape(String),
}

/// Message in the request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
        }
    }
}

/// Flatten prior turns into the request message sequence: a user/assistant
/// pair per turn, in original order, then the new input as a user message.
/// Always `2N + 1` entries for N prior turns.
pub fn build_messages(prior: &[Turn], input: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(prior.len() * 2 + 1);
    for turn in prior {
        messages.push(ChatMessage::user(&turn.question));
        messages.push(ChatMessage::assistant(&turn.answer));
    }
    messages.push(ChatMessage::user(input));
    messages
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for the completion endpoint
#[derive(Clone)]
pub struct CompletionClient {
    config: Config,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Send the conversation plus new input and extract the first choice's
    /// text. One outbound call, no retries.
    pub async fn complete(&self, input: &str, prior: &[Turn]) -> Result<String, CompletionError> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| CompletionError::Auth("no API key configured".to_string()))?;

        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": build_messages(prior, input),
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Auth(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Transport(format!("{}: {}", status, body)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Shape(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Shape("response contained no choices".to_string()))
    }

    /// Compatibility path: never fails. Any transport, auth, or shape
    /// failure is logged and converted to the sentinel string.
    pub async fn complete_or_sentinel(&self, input: &str, prior: &[Turn]) -> String {
        match self.complete(input, prior).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::error!(error = %err, "completion request failed");
                SENTINEL.to_string()
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}
