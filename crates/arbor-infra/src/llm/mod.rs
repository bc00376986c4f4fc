//! Outbound chat-completion HTTP client.

pub mod completions;
pub mod reasoning;
