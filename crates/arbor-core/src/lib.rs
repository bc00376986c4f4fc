//! Business logic and repository trait definitions for arbor.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the conversation-tree algorithms: path
//! materialization, context resolution, branch resolution, and the follow-up
//! mutator. It depends only on `arbor-types` -- never on `arbor-infra` or any
//! database/IO crate.

pub mod chat;
pub mod llm;
pub mod user;
