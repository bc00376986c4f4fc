//! Conversation title generation via LLM.
//!
//! `generate_title` creates a short, descriptive title for a new
//! conversation from the user's first prompt, in the style of ChatGPT
//! conversation naming.

use arbor_types::error::LlmError;
use arbor_types::llm::{ChatTurn, MessageRole};

use crate::llm::provider::CompletionClient;

/// Fixed small model for title generation; independent of the
/// conversation's own model.
pub const TITLE_MODEL: &str = "openai/gpt-oss-20b";

/// System prompt for the title generation LLM call.
const TITLE_SYSTEM_PROMPT: &str = r#"You are a title generator. Read the user's message and produce a short, descriptive title that captures its main topic or intent.

Rules:
1. Respond with the title only, nothing else.
2. Keep it concise (under 10 words).
3. Use clear, natural language without jargon.
4. Capitalize the first letter of major words.
5. No surrounding quotes and no trailing punctuation.

Example:
User: "I need help understanding how SQL joins work"
Title: "Understanding SQL Joins""#;

/// Generate a conversation title from the user's first prompt.
///
/// The result is trimmed of whitespace and surrounding quotes.
#[tracing::instrument(name = "generate_title", skip(client, first_user_message))]
pub async fn generate_title<L: CompletionClient>(
    client: &L,
    first_user_message: &str,
) -> Result<String, LlmError> {
    let turns = vec![
        ChatTurn {
            role: MessageRole::System,
            content: TITLE_SYSTEM_PROMPT.to_string(),
        },
        ChatTurn {
            role: MessageRole::User,
            content: first_user_message.to_string(),
        },
    ];

    let reply = client.complete(TITLE_MODEL, &turns).await?;

    let title = reply
        .content
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string();

    Ok(title)
}
