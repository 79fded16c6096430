use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use rentbot_core::domain::conversation::{ConversationTurn, TurnRole};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        match turn.role {
            TurnRole::User => Self::user(turn.content.clone()),
            TurnRole::Assistant => Self::assistant(turn.content.clone()),
        }
    }
}

/// A named JSON schema the model output must conform to.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// `None` asks for free text.
    pub response_schema: Option<ResponseSchema>,
}

impl CompletionRequest {
    pub fn text(messages: Vec<ChatMessage>) -> Self {
        Self { messages, response_schema: None }
    }

    pub fn structured(messages: Vec<ChatMessage>, schema: ResponseSchema) -> Self {
        Self { messages, response_schema: Some(schema) }
    }
}

/// What the model said. A provider refusal arrives in `refusal` with no content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LlmReply {
    pub content: Option<String>,
    pub refusal: Option<String>,
}

impl LlmReply {
    pub fn content(text: impl Into<String>) -> Self {
        Self { content: Some(text.into()), refusal: None }
    }

    pub fn refusal(reason: impl Into<String>) -> Self {
        Self { content: None, refusal: Some(reason.into()) }
    }

    /// Non-blank content, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().map(str::trim).filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm transport failure: {0}")]
    Transport(String),
    #[error("llm request timed out")]
    Timeout,
    #[error("llm endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response could not be decoded: {0}")]
    Decode(String),
}

impl LlmError {
    /// Transport failures, timeouts, rate limiting and server errors are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<LlmReply, LlmError>;
}
