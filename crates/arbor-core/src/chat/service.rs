//! Chat service orchestrating conversation lifecycle and tree reads/writes.
//!
//! ChatService owns the three tree algorithms: the follow-up mutator (the
//! only write path that creates non-root messages), the context resolver,
//! and the branch resolver. All of them are thin walks over the stored
//! (id, parent_id, path) triples; see [`crate::chat::branch`] for the
//! annotation step.

use arbor_types::conversation::Conversation;
use arbor_types::error::ChatError;
use arbor_types::message::{BranchedMessage, Message, MessageRole};
use arbor_types::user::User;
use tracing::info;
use uuid::Uuid;

use crate::chat::branch;
use crate::chat::prompt;
use crate::chat::repository::{ConversationRepository, MessageRepository};

/// Orchestrates conversation lifecycle and message-tree operations.
///
/// Generic over the repository traits to maintain clean architecture
/// (arbor-core never depends on arbor-infra).
pub struct ChatService<M: MessageRepository, C: ConversationRepository> {
    messages: M,
    conversations: C,
}

impl<M: MessageRepository, C: ConversationRepository> ChatService<M, C> {
    pub fn new(messages: M, conversations: C) -> Self {
        Self {
            messages,
            conversations,
        }
    }

    /// Access the message repository.
    pub fn message_repo(&self) -> &M {
        &self.messages
    }

    /// Access the conversation repository.
    pub fn conversation_repo(&self) -> &C {
        &self.conversations
    }

    // --- Conversation lifecycle ---

    /// Create a conversation and its root system message in one transaction.
    ///
    /// The root's content is the system prompt, with the owning user's
    /// personality folded in when present.
    pub async fn create_conversation(
        &self,
        user: &User,
        model_id: String,
    ) -> Result<(Conversation, Message), ChatError> {
        let conversation = Conversation::new(user.id, model_id);
        let root = Message::root(
            conversation.id,
            prompt::system_prompt(user.personality.as_deref()),
        );
        self.conversations
            .create_with_root(&conversation, &root)
            .await?;
        info!(conversation_id = %conversation.id, user_id = %user.id, "conversation created");
        Ok((conversation, root))
    }

    pub async fn get_conversation(&self, id: &Uuid) -> Result<Conversation, ChatError> {
        self.conversations
            .get(id)
            .await?
            .ok_or(ChatError::ConversationNotFound)
    }

    pub async fn list_conversations(&self, user_id: &Uuid) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.conversations.list_for_user(user_id).await?)
    }

    pub async fn update_title(&self, id: &Uuid, title: &str) -> Result<(), ChatError> {
        self.conversations
            .update_title(id, title)
            .await
            .map_err(|e| match e {
                arbor_types::error::RepositoryError::NotFound => ChatError::ConversationNotFound,
                other => ChatError::Storage(other),
            })
    }

    /// Delete a conversation and every message in its tree.
    pub async fn delete_conversation(&self, id: &Uuid) -> Result<(), ChatError> {
        self.conversations.delete(id).await.map_err(|e| match e {
            arbor_types::error::RepositoryError::NotFound => ChatError::ConversationNotFound,
            other => ChatError::Storage(other),
        })?;
        info!(conversation_id = %id, "conversation deleted");
        Ok(())
    }

    // --- Tree operations ---

    pub async fn get_message(&self, id: &Uuid) -> Result<Message, ChatError> {
        self.messages
            .get(id)
            .await?
            .ok_or(ChatError::MessageNotFound)
    }

    /// Append a follow-up message under `parent_id`.
    ///
    /// This is the only write path that creates non-root messages: user
    /// turns, assistant replies, and regenerations (siblings) all go through
    /// it, differing only in their parent.
    pub async fn follow_up(
        &self,
        parent_id: &Uuid,
        role: MessageRole,
        content: String,
        reasoning: Option<String>,
    ) -> Result<Message, ChatError> {
        let parent = self.get_message(parent_id).await?;
        let child = Message::child_of(&parent, role, content, reasoning);
        self.messages.create(&child).await?;
        Ok(child)
    }

    /// Linear context from the conversation root to `message_id`, inclusive,
    /// in chronological (and hence root-to-leaf) order.
    pub async fn context(&self, message_id: &Uuid) -> Result<Vec<Message>, ChatError> {
        let message = self.get_message(message_id).await?;
        Ok(self.messages.get_by_ids(&message.path).await?)
    }

    /// Sibling continuations recorded under `message_id`, in creation order.
    pub async fn children(&self, message_id: &Uuid) -> Result<Vec<Message>, ChatError> {
        let message = self.get_message(message_id).await?;
        Ok(self.messages.children_of(&[message.id]).await?)
    }

    /// The tip of the branch a client is viewing: the most recently created
    /// message of the conversation, optionally restricted to branches whose
    /// path passes through `containing`.
    pub async fn current_leaf(
        &self,
        conversation_id: &Uuid,
        containing: Option<&Uuid>,
    ) -> Result<Message, ChatError> {
        let conversation = self.get_conversation(conversation_id).await?;
        if let Some(message_id) = containing {
            self.get_message(message_id).await?;
        }
        self.messages
            .latest_in_conversation(&conversation.id, containing)
            .await?
            .ok_or(ChatError::MessageNotFound)
    }

    /// The leaf's ancestor path annotated with branch positions.
    ///
    /// With fewer than two path nodes no fork is possible; the plain context
    /// is returned with every branch marked absent.
    pub async fn branch_info(&self, leaf_id: &Uuid) -> Result<Vec<BranchedMessage>, ChatError> {
        let leaf = self.get_message(leaf_id).await?;
        let nodes = self.messages.get_by_ids(&leaf.path).await?;

        if leaf.path.len() < 2 {
            return Ok(nodes
                .into_iter()
                .map(|message| BranchedMessage {
                    message,
                    branch: None,
                })
                .collect());
        }

        // The leaf itself need not be queried as a parent.
        let parents = &leaf.path[..leaf.path.len() - 1];
        let children = self.messages.children_of(parents).await?;
        Ok(branch::annotate(nodes, &children))
    }
}
