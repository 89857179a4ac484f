//! Learning-objective list handling.
//!
//! Objectives are edited as free text. Users type them as bullets, numbered
//! lists, or one per line; AI responses return them as a list. These helpers
//! convert between the two so adopted suggestions land in the draft as a
//! consistently numbered list.

use std::sync::LazyLock;

use regex::Regex;

static ITEM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)]|\(\d+\))(?:\s+|$)").unwrap());

/// Split free-text objectives into individual items.
///
/// One item per non-blank line, with bullets and numbering removed.
///
/// # Example
///
/// ```
/// use id_dss::text::parse_objectives;
///
/// let items = parse_objectives("1. Explain gradient descent\n- Compare optimizers\n\n");
/// assert_eq!(items, vec!["Explain gradient descent", "Compare optimizers"]);
/// ```
pub fn parse_objectives(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| ITEM_MARKER.replace(line, "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Join objectives into a numbered list, one per line.
pub fn format_objectives<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref().trim())
        .filter(|item| !item.is_empty())
        .enumerate()
        .map(|(index, item)| format!("{}. {}", index + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renumber free-text objectives as a clean numbered list.
pub fn normalize_objectives(text: &str) -> String {
    format_objectives(&parse_objectives(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_markers() {
        let text = "- Define supervised learning\n2) Train a model\n(3) Evaluate it\n• Reflect\nPlain line";
        assert_eq!(
            parse_objectives(text),
            vec![
                "Define supervised learning",
                "Train a model",
                "Evaluate it",
                "Reflect",
                "Plain line"
            ]
        );
    }

    #[test]
    fn keeps_leading_numbers_that_are_content() {
        assert_eq!(parse_objectives("3D modeling basics"), vec!["3D modeling basics"]);
    }

    #[test]
    fn markers_need_trailing_space() {
        assert_eq!(
            parse_objectives("1.5 hours of guided practice\n*Explain* gradient descent"),
            vec!["1.5 hours of guided practice", "*Explain* gradient descent"]
        );
    }

    #[test]
    fn bare_marker_lines_are_dropped() {
        assert_eq!(parse_objectives("-\n1.\nApply"), vec!["Apply"]);
    }

    #[test]
    fn empty_input_gives_no_items() {
        assert!(parse_objectives("").is_empty());
        assert!(parse_objectives("\n  \n").is_empty());
    }

    #[test]
    fn format_skips_blank_items() {
        let items = vec!["First", "  ", "Second"];
        assert_eq!(format_objectives(&items), "1. First\n2. Second");
    }

    #[test]
    fn normalize_renumbers() {
        assert_eq!(
            normalize_objectives("5. Explain\n9. Apply"),
            "1. Explain\n2. Apply"
        );
    }
}
