//! OpenAiProvider -- concrete [`CompletionProvider`] implementation for the
//! OpenAI Chat Completions API.
//!
//! Sends non-streaming requests to `/v1/chat/completions` with Bearer
//! authentication. The API key is wrapped in [`secrecy::SecretString`] and
//! is never logged or included in `Debug` output; a provider constructed
//! without a key reports [`LlmError::MissingCredential`] on use, so the
//! append path can degrade to its fallback reply instead of crashing.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use blendchat_core::llm::provider::CompletionProvider;
use blendchat_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::types::{OpenAiChatRequest, OpenAiChatResponse};

/// OpenAI chat-completion provider.
// Intentionally no Debug derive: the SecretString field already guards the
// key, omitting Debug entirely keeps internal state out of logs.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
}

impl OpenAiProvider {
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";

    /// Create a new provider. `api_key` may be absent; completion calls
    /// then fail with `MissingCredential` instead of panicking at startup.
    pub fn new(api_key: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let Some(api_key) = &self.api_key else {
            return Err(LlmError::MissingCredential);
        };

        let body = OpenAiChatRequest::from_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(model = %request.model, turns = request.messages.len(), "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let wire: OpenAiChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = wire
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default();

        let usage = wire
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: wire.id,
            content,
            model: wire.model,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_fails_without_io() {
        let provider = OpenAiProvider::new(None);
        let request = CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![],
            system: None,
            max_tokens: None,
            temperature: None,
        };
        let err = provider.complete(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential));
    }

    #[test]
    fn test_with_base_url_override() {
        let provider = OpenAiProvider::new(Some(SecretString::from("sk-test")))
            .with_base_url("http://127.0.0.1:9999".to_string());
        assert_eq!(provider.base_url, "http://127.0.0.1:9999");
        assert_eq!(provider.name(), "openai");
    }
}
