//! Analyze command implementation.
//!
//! The `id-dss analyze` command sends learning objectives to the AI
//! backend and prints the Bloom's taxonomy analysis.

use crate::api::ApiClient;
use crate::cli::args::AnalyzeArgs;
use crate::error::Result;
use crate::model::Phase;
use crate::ui::UserInterface;
use crate::workflow::{GenerationOutcome, Workflow};

use super::dispatcher::{Command, CommandResult};
use super::display;
use super::generation::{generate, hint_action, objectives_for};

/// The analyze command implementation.
pub struct AnalyzeCommand {
    api: ApiClient,
    args: AnalyzeArgs,
}

impl AnalyzeCommand {
    /// Create a new analyze command.
    pub fn new(api: ApiClient, args: AnalyzeArgs) -> Self {
        Self { api, args }
    }
}

impl Command for AnalyzeCommand {
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

        let outcome = match generate(ui, "Analyzing objectives...", "Analysis ready", || {
            workflow.run_objective_analysis(&objectives)
        }) {
            Ok(outcome) => outcome,
            Err(_) => return Ok(CommandResult::failure(1)),
        };

        display::show_outcome_notice(ui, &outcome);
        if outcome != GenerationOutcome::Stale {
            if let Some(analysis) = &workflow.store().state().objective_analysis {
                display::show_objective_analysis(ui, analysis);
            }
        }
        hint_action(ui, workflow.store(), &Phase::ObjectiveAnalysis);
        Ok(CommandResult::success())
    }
}
