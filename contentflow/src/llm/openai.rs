//! OpenAI-compatible chat-completion provider.

use super::{ChatProvider, ChatRequest, LlmResponse, ProviderError};
use crate::config::ProviderSettings;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

/// Longest error body kept in [`ProviderError::Api`].
const MAX_ERROR_BODY: usize = 2048;

/// OpenAI chat-completions API provider.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl OpenAiProvider {
    /// Creates a provider from settings.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transport`] if the HTTP client cannot be built.
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
        })
    }

    /// Returns the chat-completions endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parse_body(body: CompletionBody, requested_model: &str) -> Result<LlmResponse, ProviderError> {
        let choice = body.choices.into_iter().next().ok_or(ProviderError::EmptyResponse)?;
        let content = choice
            .message
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(LlmResponse {
            content,
            model: body.model.unwrap_or_else(|| requested_model.to_string()),
            provider: "openai".to_string(),
            input_tokens: body.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens: body.usage.as_ref().map(|u| u.completion_tokens),
            latency_ms: None,
            finish_reason: choice.finish_reason,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse, ProviderError> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(
                body.char_indices()
                    .nth(MAX_ERROR_BODY)
                    .map_or(body.len(), |(idx, _)| idx),
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: CompletionBody = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let mut parsed = Self::parse_body(body, &request.model)?;
        parsed.latency_ms = Some(start.elapsed().as_secs_f64() * 1000.0);

        debug!(
            label = request.label.as_deref().unwrap_or("-"),
            model = %parsed.model,
            total_tokens = parsed.total_tokens(),
            latency_ms = parsed.latency_ms,
            "Chat completion received"
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: serde_json::Value) -> Result<LlmResponse, ProviderError> {
        let body: CompletionBody = serde_json::from_value(json).unwrap();
        OpenAiProvider::parse_body(body, "gpt-4o-mini")
    }

    #[test]
    fn test_endpoint_from_base_url() {
        let settings = ProviderSettings::new("sk-test").with_base_url("http://localhost:9999/v1/");
        let provider = OpenAiProvider::new(&settings).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_parse_body() {
        let response = decode(serde_json::json!({
            "model": "gpt-4o-mini-2024",
            "choices": [{"message": {"role": "assistant", "content": "  Hello  "}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }))
        .unwrap();

        assert_eq!(response.content, "Hello");
        assert_eq!(response.model, "gpt-4o-mini-2024");
        assert_eq!(response.total_tokens(), 15);
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_body_without_choices() {
        let err = decode(serde_json::json!({"choices": []})).unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse);
    }

    #[test]
    fn test_parse_body_with_blank_content() {
        let err = decode(serde_json::json!({
            "choices": [{"message": {"content": "   "}}]
        }))
        .unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse);

        let err = decode(serde_json::json!({
            "choices": [{"message": {"content": null}}]
        }))
        .unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse);
    }
}
