//! Action command implementation.
//!
//! The `id-dss action` command records a decision (accept, reject, edit,
//! comment or regenerate) on a design step. Activity-level decisions carry
//! the activity id (`activity-N`) as the comment.

use crate::api::ApiClient;
use crate::cli::args::ActionArgs;
use crate::error::Result;
use crate::model::ActionType;
use crate::ui::UserInterface;
use crate::workflow::Workflow;

use super::dispatcher::{Command, CommandResult};

/// The action command implementation.
pub struct ActionCommand {
    api: ApiClient,
    args: ActionArgs,
}

impl ActionCommand {
    /// Create a new action command.
    pub fn new(api: ApiClient, args: ActionArgs) -> Self {
        Self { api, args }
    }
}

impl Command for ActionCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let action_type = ActionType::from(self.args.action_type.clone());
        if action_type == ActionType::Edit && self.args.edited.is_none() {
            ui.error("An edit needs the new content: pass --edited.");
            return Ok(CommandResult::failure(2));
        }

        let mut workflow = Workflow::new(self.api.clone());
        match workflow.record_action(
            self.args.step_id,
            self.args.recommendation,
            action_type,
            self.args.edited.clone(),
            self.args.comment.clone(),
        ) {
            Ok(action) => {
                ui.success(&format!(
                    "Recorded {} on step {} (action {})",
                    action.action_type, action.step_id, action.id
                ));
                Ok(CommandResult::success())
            }
            Err(e) => {
                ui.error(&e.user_message());
                Ok(CommandResult::failure(1))
            }
        }
    }
}
