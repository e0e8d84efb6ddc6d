//! CompletionProvider trait definition.
//!
//! The abstraction over text-completion backends. Uses native async fn in
//! traits (RPITIT, Rust 2024 edition). Implementations live in
//! blendchat-infra (e.g., `OpenAiProvider`).

use blendchat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Port for text-completion backends.
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
