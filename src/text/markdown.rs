//! Markdown stripping for model output.
//!
//! Models answer with markdown even when asked not to. These helpers reduce
//! it to plain text while keeping the content: code stays, links keep their
//! label, emphasis markers go.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::model::llm::value_to_text;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static FENCE_OPENING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```[a-zA-Z]*\n?").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+").unwrap());
static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s{0,3}>\s?").unwrap());
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*•]|\d+\.)\s+").unwrap());
static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__([^_]+)__").unwrap());
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_([^_]+)_").unwrap());
static TRAILING_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

/// Remove common markdown artifacts, keeping the plain text.
///
/// # Example
///
/// ```
/// use id_dss::text::strip_markdown;
///
/// assert_eq!(
///     strip_markdown("**bold** and `code` and [link](url)"),
///     "bold and code and link"
/// );
/// ```
pub fn strip_markdown(text: &str) -> String {
    let s = FENCED_BLOCK.replace_all(text, |caps: &Captures| {
        FENCE_OPENING.replace(&caps[0], "").replace("```", "")
    });
    let s = INLINE_CODE.replace_all(&s, "$1");
    let s = LINK.replace_all(&s, "$1");
    let s = HEADING.replace_all(&s, "");
    let s = BLOCKQUOTE.replace_all(&s, "");
    let s = LIST_MARKER.replace_all(&s, "");
    let s = BOLD_STARS.replace_all(&s, "$1");
    let s = BOLD_UNDERSCORES.replace_all(&s, "$1");
    let s = ITALIC_STAR.replace_all(&s, "$1");
    let s = ITALIC_UNDERSCORE.replace_all(&s, "$1");
    let s = TRAILING_WS.replace_all(&s, "");
    s.trim().to_string()
}

/// Stringify a JSON value and strip markdown from the result.
pub fn clean_text(value: &Value) -> String {
    strip_markdown(&value_to_text(value))
}

/// Cleaned, non-empty, trimmed lines of `text`.
pub fn clean_lines(text: &str) -> Vec<String> {
    strip_markdown(text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Drop a leading ```` ```json ```` / ```` ``` ```` and a trailing ```` ``` ````
/// around a model response so the body can be parsed as JSON.
pub fn strip_code_fences(text: &str) -> String {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_inline_markup() {
        assert_eq!(
            strip_markdown("**bold** and `code` and [link](url)"),
            "bold and code and link"
        );
    }

    #[test]
    fn strips_headings_quotes_and_lists() {
        let input = "## Overview\n> quoted line\n- first\n* second\n3. third";
        assert_eq!(
            strip_markdown(input),
            "Overview\nquoted line\nfirst\nsecond\nthird"
        );
    }

    #[test]
    fn keeps_fenced_code_content() {
        let input = "Run this:\n```python\nprint('hi')\n```\ndone";
        assert_eq!(strip_markdown(input), "Run this:\nprint('hi')\n\ndone");
    }

    #[test]
    fn strips_underscore_emphasis() {
        assert_eq!(strip_markdown("__strong__ and _soft_"), "strong and soft");
    }

    #[test]
    fn removes_trailing_whitespace_per_line() {
        assert_eq!(strip_markdown("line one   \nline two\t"), "line one\nline two");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(strip_markdown("Nothing to see here."), "Nothing to see here.");
        assert_eq!(strip_markdown(""), "");
    }

    #[test]
    fn clean_text_handles_non_strings() {
        assert_eq!(clean_text(&json!(null)), "");
        assert_eq!(clean_text(&json!(45)), "45");
        assert_eq!(clean_text(&json!("*Lab* session")), "Lab session");
    }

    #[test]
    fn clean_lines_drops_blank_lines() {
        assert_eq!(
            clean_lines("- one\n\n   \n- **two**\n"),
            vec!["one".to_string(), "two".to_string()]
        );
    }

    #[test]
    fn strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }
}
