//! Groq chat completions adapter (OpenAI-compatible API).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatProvider, Completion};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model; compound models run web search server-side
pub const DEFAULT_MODEL: &str = "groq/compound";

/// Groq API client
pub struct GroqClient {
    /// API key (bearer token)
    api_key: String,
    /// Model identifier
    model: String,
    /// API root, without trailing slash
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Request body for /chat/completions
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// Response from /chat/completions
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Completion,
}

impl GroqClient {
    /// Create a client for the default endpoint and model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_MODEL, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom model and API root
    pub fn with_endpoint(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from resolved settings; fails without an API key
    pub fn from_settings(settings: &crate::config::GroqSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .context("GROQ_API_KEY is not set")?;
        Ok(Self::with_endpoint(
            api_key,
            settings.model.clone(),
            settings.base_url.clone(),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let url = self.api_url("chat/completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await
            .context("Groq API call failed (HTTP)")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Groq API error: {} - {}", status, body);
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse Groq response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .context("Groq response contained no choices")
    }
}
