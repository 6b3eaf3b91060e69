//! Chat passthrough to an external completion provider.
//!
//! The service forwards a message (or a bounded conversation) and shapes the
//! provider's completion into a [`ChatReply`]: trimmed answer, reasoning
//! shortened to [`MAX_REASONING_CHARS`], and the cited web sources.

pub mod shape;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::adapters::{ChatMessage, ChatProvider, Completion, Role};

pub use shape::{clean_title, extract_sources, shorten};

/// Longest reasoning summary returned to clients
pub const MAX_REASONING_CHARS: usize = 350;

/// Longest generated title
pub const MAX_TITLE_CHARS: usize = 80;

/// Most recent turns forwarded from a conversation
pub const MAX_HISTORY_TURNS: usize = 12;

const TITLE_PROMPT: &str = "Придумай короткий заголовок (до 80 символов) для следующего \
текста. Ответь только заголовком, без кавычек и пояснений.";

/// Errors from the chat service
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("Provider error: {0}")]
    Provider(#[from] anyhow::Error),
}

/// A cited web source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Structured chat reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub reasoning: Option<String>,
    pub sources: Vec<Source>,
}

impl ChatReply {
    /// Shape a raw provider completion
    pub fn from_completion(completion: Completion) -> Self {
        let answer = completion.content.as_deref().unwrap_or("").trim().to_string();
        let reasoning = completion
            .reasoning
            .as_deref()
            .map(|r| shorten(r, MAX_REASONING_CHARS))
            .filter(|r| !r.is_empty());
        let sources = extract_sources(&completion.executed_tools);

        Self {
            answer,
            reasoning,
            sources,
        }
    }
}

/// Generated title reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleReply {
    pub title: String,
}

/// One turn of a client-side conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Keep the last [`MAX_HISTORY_TURNS`] non-empty user/assistant turns
pub fn bound_history(turns: &[ChatTurn]) -> Vec<ChatMessage> {
    let kept: Vec<&ChatTurn> = turns
        .iter()
        .filter(|t| t.role != Role::System && !t.content.trim().is_empty())
        .collect();
    let skip = kept.len().saturating_sub(MAX_HISTORY_TURNS);

    kept.into_iter()
        .skip(skip)
        .map(|t| ChatMessage::new(t.role, t.content.trim()))
        .collect()
}

/// Chat service over any provider
pub struct ChatService<P> {
    provider: P,
}

impl<P: ChatProvider> ChatService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Answer a single user message
    pub async fn ask(&self, message: &str) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        self.send(&[ChatMessage::user(message)]).await
    }

    /// Answer the last turn of a conversation, forwarding a bounded history
    pub async fn ask_history(&self, turns: &[ChatTurn]) -> Result<ChatReply, ChatError> {
        let messages = bound_history(turns);
        if !messages.iter().any(|m| m.role == Role::User) {
            return Err(ChatError::EmptyInput);
        }
        self.send(&messages).await
    }

    /// Generate a short title for `text`
    #[instrument(skip(self, text), fields(provider = self.provider.name()))]
    pub async fn title(&self, text: &str) -> Result<TitleReply, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let messages = [ChatMessage::system(TITLE_PROMPT), ChatMessage::user(text)];
        let completion = self.provider.complete(&messages).await?;
        let raw = completion.content.unwrap_or_default();

        Ok(TitleReply {
            title: clean_title(&raw, MAX_TITLE_CHARS),
        })
    }

    #[instrument(skip(self, messages), fields(provider = self.provider.name(), turns = messages.len()))]
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatReply, ChatError> {
        let completion = self.provider.complete(messages).await?;
        let reply = ChatReply::from_completion(completion);
        debug!(
            answer_chars = reply.answer.chars().count(),
            sources = reply.sources.len(),
            "Chat reply shaped"
        );
        Ok(reply)
    }
}
