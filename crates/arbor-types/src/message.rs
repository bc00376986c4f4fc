//! Tree-structured message types for arbor.
//!
//! Conversations are stored as a branching tree: regenerating or editing a
//! reply creates a sibling continuation under the same parent. Every message
//! carries its full ancestor path (root -> self) as an ordered id sequence,
//! written once at creation. That denormalized path is what makes linear
//! context retrieval O(depth) instead of a recursive parent walk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export MessageRole from the llm module (it's used in both tree and
// provider contexts).
pub use crate::llm::MessageRole;

/// A node in a conversation tree.
///
/// Invariants, maintained by the constructors below and never revisited:
/// - `path.last() == Some(&id)`
/// - with a parent, `path[..path.len() - 1] == parent.path`
/// - `path.len() == 1` iff this is the root (system) message
///
/// Messages are immutable after creation; edits and regenerations create new
/// sibling nodes instead of overwriting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    /// `None` only for the conversation's root (system) message.
    pub parent_id: Option<Uuid>,
    pub role: MessageRole,
    pub content: String,
    /// Model thinking segment, assistant messages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Ordered id sequence from the conversation root to this message,
    /// inclusive.
    pub path: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create the root (system) message of a conversation.
    ///
    /// The root's path is the single-element sequence containing its own id.
    pub fn root(conversation_id: Uuid, content: String) -> Self {
        let id = Uuid::now_v7();
        Self {
            id,
            conversation_id,
            parent_id: None,
            role: MessageRole::System,
            content,
            reasoning: None,
            path: vec![id],
            created_at: Utc::now(),
        }
    }

    /// Create a follow-up message under `parent`.
    ///
    /// The child's path is the parent's path with the new id appended --
    /// purely additive, O(1) per append.
    pub fn child_of(
        parent: &Message,
        role: MessageRole,
        content: String,
        reasoning: Option<String>,
    ) -> Self {
        let id = Uuid::now_v7();
        let mut path = Vec::with_capacity(parent.path.len() + 1);
        path.extend_from_slice(&parent.path);
        path.push(id);
        Self {
            id,
            conversation_id: parent.conversation_id,
            parent_id: Some(parent.id),
            role,
            content,
            reasoning,
            path,
            created_at: Utc::now(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Which sibling branch a leaf's path took at a fork.
///
/// Derived at read time from the live sibling set, never stored: `current`
/// is the 1-based rank (by creation time) of the child this path descended
/// through, among the fork's `total` children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub total: u32,
    pub current: u32,
}

/// A path node annotated with its branch position.
///
/// `branch` is `None` wherever the node is not a fork (fewer than two
/// children recorded at query time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchedMessage {
    #[serde(flatten)]
    pub message: Message,
    pub branch: Option<BranchInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_own_id() {
        let root = Message::root(Uuid::now_v7(), "system".to_string());
        assert_eq!(root.path, vec![root.id]);
        assert!(root.is_root());
        assert_eq!(root.role, MessageRole::System);
    }

    #[test]
    fn test_child_path_extends_parent() {
        let root = Message::root(Uuid::now_v7(), "system".to_string());
        let child = Message::child_of(&root, MessageRole::User, "hi".to_string(), None);

        assert_eq!(child.parent_id, Some(root.id));
        assert_eq!(child.conversation_id, root.conversation_id);
        assert_eq!(child.path.last(), Some(&child.id));
        assert_eq!(&child.path[..child.path.len() - 1], root.path.as_slice());
        assert!(!child.is_root());
    }

    #[test]
    fn test_siblings_share_prefix_not_id() {
        let root = Message::root(Uuid::now_v7(), "system".to_string());
        let a = Message::child_of(&root, MessageRole::Assistant, "first".to_string(), None);
        let b = Message::child_of(&root, MessageRole::Assistant, "second".to_string(), None);

        assert_ne!(a.id, b.id);
        assert_eq!(a.path[..1], b.path[..1]);
        assert_eq!(a.parent_id, b.parent_id);
    }

    #[test]
    fn test_created_at_increases_along_path() {
        let root = Message::root(Uuid::now_v7(), "system".to_string());
        let child = Message::child_of(&root, MessageRole::User, "hi".to_string(), None);
        assert!(child.created_at >= root.created_at);
    }

    #[test]
    fn test_branched_message_serializes_flat() {
        let root = Message::root(Uuid::now_v7(), "system".to_string());
        let annotated = BranchedMessage {
            message: root,
            branch: Some(BranchInfo {
                total: 3,
                current: 2,
            }),
        };
        let json = serde_json::to_value(&annotated).unwrap();
        // Flattened: message fields at the top level, branch beside them.
        assert!(json.get("id").is_some());
        assert!(json.get("message").is_none());
        assert_eq!(json["branch"]["total"], 3);
        assert_eq!(json["branch"]["current"], 2);
    }

    #[test]
    fn test_branchless_message_serializes_null_branch() {
        let root = Message::root(Uuid::now_v7(), "system".to_string());
        let annotated = BranchedMessage {
            message: root,
            branch: None,
        };
        let json = serde_json::to_value(&annotated).unwrap();
        assert!(json["branch"].is_null());
    }
}
