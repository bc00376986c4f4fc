//! `<think>...</think>` reasoning extraction.
//!
//! Some models prefix their completion with a thinking segment wrapped in
//! `<think>` tags. The split keeps the segment as `reasoning` and the
//! remainder as the visible content.

use std::sync::LazyLock;

use regex::Regex;

static THINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<think>(.+)</think>(.+)$").expect("think regex is valid"));

/// Split a `<think>...</think>` prefix off `content`.
///
/// Returns `(reasoning, visible_content)`; `reasoning` is `None` when the
/// content does not start with a completed think tag.
pub fn split_reasoning(content: &str) -> (Option<String>, String) {
    match THINK_RE.captures(content) {
        Some(caps) => (Some(caps[1].to_string()), caps[2].to_string()),
        None => (None, content.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_think_prefix() {
        let (reasoning, content) = split_reasoning("<think>step by step</think>The answer is 4.");
        assert_eq!(reasoning.as_deref(), Some("step by step"));
        assert_eq!(content, "The answer is 4.");
    }

    #[test]
    fn test_think_spans_newlines() {
        let (reasoning, content) =
            split_reasoning("<think>line one\nline two</think>\nFinal answer.");
        assert_eq!(reasoning.as_deref(), Some("line one\nline two"));
        assert_eq!(content, "\nFinal answer.");
    }

    #[test]
    fn test_plain_content_passes_through() {
        let (reasoning, content) = split_reasoning("Just an answer.");
        assert!(reasoning.is_none());
        assert_eq!(content, "Just an answer.");
    }

    #[test]
    fn test_unterminated_tag_is_left_alone() {
        let (reasoning, content) = split_reasoning("<think>never closed");
        assert!(reasoning.is_none());
        assert_eq!(content, "<think>never closed");
    }

    #[test]
    fn test_tag_mid_content_is_not_a_prefix() {
        let (reasoning, content) = split_reasoning("answer <think>late</think> more");
        assert!(reasoning.is_none());
        assert_eq!(content, "answer <think>late</think> more");
    }
}
