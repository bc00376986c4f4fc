//! Shared domain types for arbor.
//!
//! This crate contains the domain types used across the arbor backend:
//! conversations, tree-structured messages, users, the LLM boundary types,
//! and their associated error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod conversation;
pub mod error;
pub mod llm;
pub mod message;
pub mod user;
