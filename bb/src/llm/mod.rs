//! LLM Client module for BuilderBot
//!
//! Provides the text-generation collaborator: a stateless completion trait, an
//! OpenAI-compatible HTTP client, and the `generate_text` helper the session
//! controller uses.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Supports "mistral" and "openai", both served by the chat completions client.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "mistral" | "openai" => {
            debug!("create_client: creating chat completions client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: mistral, openai",
                other
            )))
        }
    }
}

/// Run one system + user completion and return its text
///
/// Errors and empty responses both come back as `None`; callers treat that
/// as "generation failed".
pub async fn generate_text(
    llm: &Arc<dyn LlmClient>,
    system_prompt: &str,
    user_text: &str,
    max_tokens: u32,
) -> Option<String> {
    debug!(user_len = user_text.len(), "generate_text: called");

    let request = CompletionRequest::single(system_prompt, user_text, max_tokens);

    match llm.complete(request).await {
        Ok(response) => {
            let text = response.content.filter(|t| !t.trim().is_empty());
            debug!(has_text = text.is_some(), stop_reason = ?response.stop_reason, "generate_text: completed");
            text
        }
        Err(e) => {
            debug!(error = %e, rate_limited = e.is_rate_limit(), "generate_text: LLM call failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    #[tokio::test]
    async fn test_generate_text_returns_content() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(&["a chair"]));
        let text = generate_text(&llm, "system", "build a chair", 100).await;
        assert_eq!(text.as_deref(), Some("a chair"));
    }

    #[tokio::test]
    async fn test_generate_text_blank_is_none() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(&["   "]));
        assert!(generate_text(&llm, "system", "x", 100).await.is_none());
    }

    #[tokio::test]
    async fn test_generate_text_error_is_none() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::new(vec![]));
        assert!(generate_text(&llm, "system", "x", 100).await.is_none());
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
