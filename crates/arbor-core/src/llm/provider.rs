//! CompletionClient trait definition.
//!
//! The outbound chat-completion boundary: an ordered list of `{role,
//! content}` turns and a model identifier in, one assistant reply out.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).
//!
//! Implementations live in arbor-infra (e.g., `CompletionApiClient`).

use arbor_types::error::LlmError;
use arbor_types::llm::{AssistantReply, ChatTurn};

/// Trait for the chat-completion collaborator.
pub trait CompletionClient: Send + Sync {
    /// The model catalog this client can complete against.
    fn models(&self) -> &[String];

    /// Send the ordered turns to `model` and return its reply.
    fn complete(
        &self,
        model: &str,
        turns: &[ChatTurn],
    ) -> impl std::future::Future<Output = Result<AssistantReply, LlmError>> + Send;
}
