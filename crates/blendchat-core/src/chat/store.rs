//! ChatStore trait definition.
//!
//! The durable home of all chat state. Implementations live in
//! blendchat-infra (e.g., `SqliteChatStore`). Uses native async fn in
//! traits (RPITIT, Rust 2024 edition).

use blendchat_types::chat::{Chat, ChatInsights, Message};
use blendchat_types::error::RepositoryError;
use uuid::Uuid;

/// Persistence port for chats and their append-only message logs.
///
/// `append_message` must be a conditionless additive update: two
/// concurrent appends to the same chat both survive, with no
/// read-modify-write of the message list on the caller's side.
pub trait ChatStore: Send + Sync {
    /// Persist a freshly created chat atomically: the chat record, its
    /// participant token map, and its initial message.
    fn create_chat(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch a chat with participants and ordered messages, or `None` if
    /// no chat exists for the id.
    fn get_chat(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Append one message to a chat's log and advance `updated_at`.
    ///
    /// Returns `RepositoryError::NotFound` if the chat does not exist.
    fn append_message(
        &self,
        chat_id: &Uuid,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Partial-field update of the AI-derived insights, replacing the
    /// previous summary, tags, and action items.
    fn update_insights(
        &self,
        chat_id: &Uuid,
        insights: &ChatInsights,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Number of messages currently stored for a chat.
    fn count_messages(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
