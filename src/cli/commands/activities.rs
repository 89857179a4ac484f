//! Activities command implementation.

use crate::api::ApiClient;
use crate::cli::args::ActivitiesArgs;
use crate::error::Result;
use crate::model::Phase;
use crate::ui::UserInterface;
use crate::workflow::{GenerationOutcome, Workflow};

use super::dispatcher::{Command, CommandResult};
use super::display;
use super::generation::{generate, latest_ids, objectives_for};

/// Suggests learning activities for a session's objectives.
pub struct ActivitiesCommand {
    api: ApiClient,
    args: ActivitiesArgs,
}

impl ActivitiesCommand {
    pub fn new(api: ApiClient, args: ActivitiesArgs) -> Self {
        Self { api, args }
    }
}

impl Command for ActivitiesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut workflow = Workflow::new(self.api.clone());
        workflow.open_session(self.args.session_id)?;

        let objectives = match objectives_for(&workflow, self.args.objectives.as_deref()) {
            Ok(objectives) => objectives,
            Err(e) => {
                ui.error(&e.user_message());
                return Ok(CommandResult::failure(2));
            }
        };

        let outcome = match generate(ui, "Suggesting activities...", "Activities ready", || {
            workflow.run_activity_suggestion(&objectives)
        }) {
            Ok(outcome) => outcome,
            Err(_) => return Ok(CommandResult::failure(1)),
        };

        match &outcome {
            GenerationOutcome::Applied => {
                display::show_activities(ui, &workflow.store().state().activity_suggestions)
            }
            GenerationOutcome::Malformed { raw_response } => {
                display::show_malformed(ui, raw_response)
            }
            GenerationOutcome::Stale => display::show_outcome_notice(ui, &outcome),
        }

        if let Some((step_id, recommendation_id)) =
            latest_ids(workflow.store(), &Phase::ActivitySuggestion)
        {
            if let Some(first) = workflow.store().state().activity_suggestions.first() {
                let activity_id = first.id.as_deref().unwrap_or("activity-0");
                ui.show_hint(&format!(
                    "Keep or drop one: id-dss action {} accept --recommendation {} --comment {}",
                    step_id, recommendation_id, activity_id
                ));
            }
        }
        Ok(CommandResult::success())
    }
}
