//! Adapter interfaces for external completion providers.
//!
//! Provider responses are decoded once, at this boundary, into
//! [`Completion`] with explicit optional fields; nothing downstream
//! reads raw JSON.

pub mod groq;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Re-export the Groq adapter
pub use groq::GroqClient;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Assistant message as returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Completion {
    /// Answer text
    #[serde(default)]
    pub content: Option<String>,

    /// Model reasoning trace, when the model exposes one
    #[serde(default)]
    pub reasoning: Option<String>,

    /// Server-side tools the model ran (web search, ...)
    #[serde(default)]
    pub executed_tools: Vec<ExecutedTool>,
}

/// A server-side tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutedTool {
    #[serde(default)]
    pub search_results: Option<SearchResults>,
}

/// Search results come either as a bare list or wrapped in `{results: [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SearchResults {
    List(Vec<SearchHit>),
    Wrapped {
        #[serde(default)]
        results: Vec<SearchHit>,
    },
}

impl SearchResults {
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            SearchResults::List(hits) => hits,
            SearchResults::Wrapped { results } => results,
        }
    }
}

/// One web search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Trait for completion providers
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Run one chat completion
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_with_missing_fields() {
        let completion: Completion = serde_json::from_str(r#"{"content": "hi"}"#).unwrap();

        assert_eq!(completion.content.as_deref(), Some("hi"));
        assert!(completion.reasoning.is_none());
        assert!(completion.executed_tools.is_empty());
    }

    #[test]
    fn test_search_results_shapes() {
        let list: ExecutedTool = serde_json::from_str(
            r#"{"search_results": [{"title": "WHO", "url": "https://who.int"}]}"#,
        )
        .unwrap();
        let wrapped: ExecutedTool = serde_json::from_str(
            r#"{"search_results": {"results": [{"title": "WHO", "url": "https://who.int", "score": 0.9}]}}"#,
        )
        .unwrap();

        let hits = list.search_results.unwrap();
        assert_eq!(hits.hits().len(), 1);
        assert_eq!(
            wrapped.search_results.unwrap().hits()[0].url.as_deref(),
            Some("https://who.int")
        );
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&ChatMessage::user("привет")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"привет"}"#);
    }
}
