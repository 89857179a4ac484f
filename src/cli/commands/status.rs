//! Status command implementation.
//!
//! The `id-dss status` command checks that the API answers and that the
//! AI backend behind it is configured. The result is advisory: generation
//! commands still run when the probe fails.

use crate::api::{ApiClient, SessionApi};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    api: ApiClient,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header("id-dss status");
        ui.message(&format!("API: {}", self.api.base_url()));

        let mut spinner = ui.start_spinner("Checking AI backend...");
        match self.api.llm_status() {
            Ok(status) if status.configured => {
                spinner.finish_success(&format!(
                    "AI backend ready ({} {})",
                    status.provider, status.model
                ));
                Ok(CommandResult::success())
            }
            Ok(status) => {
                spinner.finish_error("AI backend is not configured");
                if !status.message.is_empty() {
                    ui.warning(&status.message);
                }
                ui.show_hint("Sessions can still be created; generation requests will fail.");
                Ok(CommandResult::failure(2))
            }
            Err(e) => {
                spinner.finish_error(&e.user_message());
                ui.show_hint("Check the server URL with --api-base or ID_DSS_API_BASE.");
                Ok(CommandResult::failure(1))
            }
        }
    }
}
