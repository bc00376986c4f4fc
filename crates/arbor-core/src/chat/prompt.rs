//! System prompt construction for new conversations.

/// Base system prompt; `{personality}` is replaced with the user's persona
/// section, or with an empty string when none is set.
const SYSTEM_PROMPT_TEMPLATE: &str = "You are an AI assistant.

Base rules:
- Be helpful, clear, and accurate.
- Adapt to the user's technical level.
- Remain respectful and follow content policies.
- Never fabricate facts.

{personality}

Apply the user's personality request to tone, style, and interaction while keeping your base rules.
If the user does not specify a personality, default to warm, professional, and slightly lighthearted.
";

/// Build the root system message content for a new conversation.
pub fn system_prompt(personality: Option<&str>) -> String {
    let section = match personality {
        Some(persona) => format!("User's desired personality: {persona}"),
        None => String::new(),
    };
    SYSTEM_PROMPT_TEMPLATE.replace("{personality}", &section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_personality_has_no_placeholder() {
        let prompt = system_prompt(None);
        assert!(!prompt.contains("{personality}"));
        assert!(!prompt.contains("desired personality"));
        assert!(prompt.contains("You are an AI assistant."));
    }

    #[test]
    fn test_prompt_folds_in_personality() {
        let prompt = system_prompt(Some("a dry-witted pirate"));
        assert!(prompt.contains("User's desired personality: a dry-witted pirate"));
    }
}
