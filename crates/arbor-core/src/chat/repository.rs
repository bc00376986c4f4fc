//! MessageRepository and ConversationRepository trait definitions.
//!
//! These are the persistence ports for the conversation tree. Implementations
//! live in arbor-infra (e.g., `SqliteMessageRepository`). Both use native
//! async fn in traits (RPITIT, Rust 2024 edition).

use arbor_types::conversation::Conversation;
use arbor_types::error::RepositoryError;
use arbor_types::message::Message;
use uuid::Uuid;

/// Repository trait for message-tree persistence.
///
/// The creation-time ordering guarantees on `get_by_ids` and `children_of`
/// are load-bearing: context resolution relies on the former, sibling rank
/// (branch numbering) on the latter.
pub trait MessageRepository: Send + Sync {
    /// Insert a node with its caller-supplied id, parent_id, and path.
    ///
    /// Parent existence is the follow-up mutator's responsibility, not the
    /// store's.
    fn create(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a message by its unique id.
    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;

    /// Get all messages whose id is in `ids`, ordered by created_at ASC.
    fn get_by_ids(
        &self,
        ids: &[Uuid],
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Get all messages whose parent_id is in `parent_ids`, ordered by
    /// created_at ASC.
    fn children_of(
        &self,
        parent_ids: &[Uuid],
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Most recently created message of a conversation; with `containing`,
    /// restricted to messages whose path includes the given id (selects the
    /// tip of the branch the client is viewing).
    fn latest_in_conversation(
        &self,
        conversation_id: &Uuid,
        containing: Option<&Uuid>,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;
}

/// Repository trait for conversation persistence.
pub trait ConversationRepository: Send + Sync {
    /// Insert a conversation together with its root message in a single
    /// transaction.
    fn create_with_root(
        &self,
        conversation: &Conversation,
        root: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a conversation by its unique id.
    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List a user's conversations, most recent first.
    fn list_for_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Replace the conversation title. Fails with `NotFound` if absent.
    fn update_title(
        &self,
        id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation and, atomically, every message in its tree.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
