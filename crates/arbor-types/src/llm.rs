//! LLM boundary types for arbor.
//!
//! The outbound chat-completion collaborator consumes an ordered list of
//! `{role, content}` turns and produces one assistant reply. These types are
//! the whole of that contract; provider wire formats stay in arbor-infra.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Role of a message in a conversation.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('system', 'user', 'assistant'))`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single `{role, content}` turn sent to the completion endpoint.
///
/// This is the projection of a stored [`crate::message::Message`] that the
/// provider sees: tree structure, reasoning, and timestamps never leave the
/// process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

/// One assistant reply from the completion collaborator.
///
/// `reasoning` carries the model's thinking segment when the provider
/// returns one (either as a dedicated field or as a `<think>...</think>`
/// prefix split off by the client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub content: String,
    pub reasoning: Option<String>,
}
