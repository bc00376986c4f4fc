//! Conversation type for arbor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conversation owned by a user.
///
/// Each conversation owns exactly one message tree, headed by a single
/// system-role root message. `title` is the only mutable field; it is
/// auto-generated from the first user prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Model identifier used for every completion in this conversation.
    pub model_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation with an empty title.
    pub fn new(user_id: Uuid, model_id: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            model_id,
            title: String::new(),
            created_at: Utc::now(),
        }
    }
}
