//! Non-interactive UI for scripts, pipes and CI.

use std::collections::HashMap;

use crate::error::{IdDssError, Result};

use super::theme::DssTheme;
use super::{scripted_answer, OutputMode, Prompt, PromptResult, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts by key.
pub const PROMPT_ENV_PREFIX: &str = "ID_DSS_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `ID_DSS_PROMPT_<KEY>` variables, then from the
/// prompt's default; anything else is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

fn env_key(prompt_key: &str) -> String {
    format!(
        "{}{}",
        PROMPT_ENV_PREFIX,
        prompt_key.to_uppercase().replace(['-', '.'], "_")
    )
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        if let Some(value) = self.env_overrides.get(&env_key(&prompt.key)) {
            return Ok(scripted_answer(prompt, value));
        }

        if let Some(default) = &prompt.default {
            return Ok(scripted_answer(prompt, default));
        }

        Err(IdDssError::Other(anyhow::anyhow!(
            "Cannot prompt for '{}' in non-interactive mode (set {} or run in a terminal)",
            prompt.key,
            env_key(&prompt.key)
        )))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("  {}", message);
        }
        Box::new(NoopSpinner { mode: self.mode })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("  {}", hint);
        }
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        if self.mode.shows_status() {
            println!("[{}/{}]", current, total);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that only prints its final line.
struct NoopSpinner {
    mode: OutputMode,
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", DssTheme::plain().format_success(msg));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("{}", DssTheme::plain().format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", DssTheme::plain().format_skipped(msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptType;

    fn ui_with(pairs: &[(&str, &str)]) -> NonInteractiveUI {
        let overrides = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NonInteractiveUI::with_overrides(OutputMode::Silent, overrides)
    }

    #[test]
    fn non_interactive_is_not_interactive() {
        assert!(!ui_with(&[]).is_interactive());
    }

    #[test]
    fn prompt_uses_default() {
        let mut ui = ui_with(&[]);
        let prompt = Prompt::input("modality", "Modality").with_default("online");
        assert_eq!(ui.prompt(&prompt).unwrap().as_string(), "online");
    }

    #[test]
    fn prompt_fails_without_default() {
        let mut ui = ui_with(&[]);
        let err = ui.prompt(&Prompt::input("course_title", "Course title")).unwrap_err();
        assert!(err.to_string().contains("ID_DSS_PROMPT_COURSE_TITLE"));
    }

    #[test]
    fn env_override_wins_over_default() {
        let mut ui = ui_with(&[("ID_DSS_PROMPT_COURSE_TITLE", "Intro to ML")]);
        let prompt = Prompt::input("course-title", "Course title").with_default("Untitled");
        assert_eq!(ui.prompt(&prompt).unwrap().as_string(), "Intro to ML");
    }

    #[test]
    fn env_override_for_confirm_is_boolean() {
        let mut ui = ui_with(&[("ID_DSS_PROMPT_SAVE", "yes")]);
        let result = ui.prompt(&Prompt::confirm("save", "Save?", false)).unwrap();
        assert_eq!(result.as_bool(), Some(true));
    }

    #[test]
    fn env_override_for_multiselect_splits_values() {
        let mut ui = ui_with(&[("ID_DSS_PROMPT_KEEP", "activity-0,activity-1")]);
        let prompt = Prompt {
            key: "keep".to_string(),
            question: "Keep which?".to_string(),
            prompt_type: PromptType::MultiSelect { options: vec![] },
            default: None,
        };
        assert_eq!(
            ui.prompt(&prompt).unwrap().as_strings(),
            vec!["activity-0", "activity-1"]
        );
    }
}
