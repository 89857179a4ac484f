//! Text cleanup for AI output and free-text objectives.
//!
//! - [`markdown`] - Best-effort markdown stripping for display and export
//! - [`objectives`] - Splitting and renumbering learning-objective lists

pub mod markdown;
pub mod objectives;

pub use markdown::{clean_lines, clean_text, strip_code_fences, strip_markdown};
pub use objectives::{format_objectives, normalize_objectives, parse_objectives};
