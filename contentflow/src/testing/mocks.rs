//! Scripted chat providers for testing.

use super::fixtures::stage_response;
use crate::core::StageName;
use crate::llm::{ChatProvider, ChatRequest, LlmResponse, ProviderError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// A provider that answers from canned per-stage responses.
///
/// Requests are routed by their label (the stage's wire name). Every request
/// is recorded so tests can inspect prompts and call order.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    overrides: Mutex<HashMap<StageName, String>>,
    fail_stages: Mutex<Vec<StageName>>,
    fail_needles: Mutex<Vec<String>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// Creates a provider answering with the fixture responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the response for one stage.
    #[must_use]
    pub fn with_response(self, stage: StageName, response: impl Into<String>) -> Self {
        self.overrides.lock().insert(stage, response.into());
        self
    }

    /// Makes every call for `stage` fail.
    #[must_use]
    pub fn fail_on_stage(self, stage: StageName) -> Self {
        self.fail_stages.lock().push(stage);
        self
    }

    /// Makes every call whose user prompt contains `needle` fail.
    #[must_use]
    pub fn fail_when_prompt_contains(self, needle: impl Into<String>) -> Self {
        self.fail_needles.lock().push(needle.into());
        self
    }

    /// Sleeps before answering each call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns all recorded requests.
    #[must_use]
    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().clone()
    }

    /// Returns the number of recorded requests.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the stages that were called, in order.
    #[must_use]
    pub fn called_stages(&self) -> Vec<StageName> {
        self.calls
            .lock()
            .iter()
            .filter_map(|req| req.label.as_deref().and_then(StageName::from_wire))
            .collect()
    }

    /// Returns the recorded request for a stage, if it was called.
    #[must_use]
    pub fn request_for(&self, stage: StageName) -> Option<ChatRequest> {
        self.calls
            .lock()
            .iter()
            .find(|req| req.label.as_deref() == Some(stage.as_str()))
            .cloned()
    }

    fn should_fail(&self, stage: Option<StageName>, request: &ChatRequest) -> bool {
        if stage.is_some_and(|s| self.fail_stages.lock().contains(&s)) {
            return true;
        }
        let prompt = request.user_prompt();
        self.fail_needles.lock().iter().any(|needle| prompt.contains(needle.as_str()))
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse, ProviderError> {
        self.calls.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let stage = request.label.as_deref().and_then(StageName::from_wire);
        if self.should_fail(stage, request) {
            return Err(ProviderError::Api {
                status: 500,
                body: format!("scripted failure for {}", request.label.as_deref().unwrap_or("request")),
            });
        }

        let Some(stage) = stage else {
            return Err(ProviderError::InvalidResponse("request carries no stage label".to_string()));
        };
        let content = self
            .overrides
            .lock()
            .get(&stage)
            .cloned()
            .unwrap_or_else(|| stage_response(stage).to_string());

        let mut response = LlmResponse::text(content, request.model.clone(), "scripted");
        response.input_tokens = Some(10);
        response.output_tokens = Some(20);
        Ok(response)
    }
}

/// A provider whose every call fails with a transport error.
#[derive(Debug, Clone, Default)]
pub struct FailingProvider {
    message: String,
}

impl FailingProvider {
    /// Creates a failing provider with the given error message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[async_trait]
impl ChatProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<LlmResponse, ProviderError> {
        Err(ProviderError::Transport(self.message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(label: &str, prompt: &str) -> ChatRequest {
        ChatRequest::new("m", "sys", prompt).with_label(label)
    }

    #[tokio::test]
    async fn test_scripted_provider_routes_by_label() {
        let provider = ScriptedProvider::new().with_response(StageName::Writer, "custom draft");

        let research = provider.complete(&request("research", "p")).await.unwrap();
        let writer = provider.complete(&request("writer", "p")).await.unwrap();

        assert!(research.content.contains("KEYWORDS:"));
        assert_eq!(writer.content, "custom draft");
        assert_eq!(provider.called_stages(), vec![StageName::Research, StageName::Writer]);
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let provider = ScriptedProvider::new()
            .fail_on_stage(StageName::Seo)
            .fail_when_prompt_contains("poison");

        assert!(provider.complete(&request("seo", "fine")).await.is_err());
        assert!(provider.complete(&request("writer", "poison pill")).await.is_err());
        assert!(provider.complete(&request("writer", "fine")).await.is_ok());
        assert!(provider.complete(&ChatRequest::new("m", "s", "u")).await.is_err());
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = FailingProvider::new("offline");
        let err = provider.complete(&request("research", "p")).await.unwrap_err();
        assert_eq!(err, ProviderError::Transport("offline".into()));
    }
}
