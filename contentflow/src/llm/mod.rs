//! Chat-completion provider integration.
//!
//! [`ChatProvider`] is the only seam between the pipeline and the remote
//! model. [`OpenAiProvider`] implements it over HTTP; tests use the scripted
//! provider from [`crate::testing`].

#[cfg(feature = "openai")]
mod openai;
mod provider;

#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;
#[cfg(test)]
pub use provider::MockChatProvider;
pub use provider::{ChatMessage, ChatProvider, ChatRequest, LlmResponse, ProviderError, Role};
