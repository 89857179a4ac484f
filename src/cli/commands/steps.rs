//! Steps command implementation.
//!
//! The `id-dss steps` command lists the design steps of a session in
//! creation order with how many recommendations and decisions each has.

use crate::api::ApiClient;
use crate::cli::args::StepsArgs;
use crate::error::Result;
use crate::text::strip_markdown;
use crate::ui::{Table, UserInterface};
use crate::workflow::Workflow;

use super::dispatcher::{Command, CommandResult};

/// The steps command implementation.
pub struct StepsCommand {
    api: ApiClient,
    args: StepsArgs,
}

impl StepsCommand {
    /// Create a new steps command.
    pub fn new(api: ApiClient, args: StepsArgs) -> Self {
        Self { api, args }
    }
}

impl Command for StepsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut workflow = Workflow::new(self.api.clone());
        let session = workflow.resume_session(self.args.session_id)?;
        let store = workflow.store();
        let steps = &store.state().design_steps;

        if steps.is_empty() {
            ui.message(&format!("Session {} has no design steps yet.", session.id));
            ui.show_hint(&format!("Start with: id-dss analyze {}", session.id));
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("{} (session {})", session.course_title, session.id));
        let mut table = Table::new(&["Step", "Phase", "Input", "Recs", "Actions", "Created"]);
        for step in steps {
            table.add_row(&[
                step.id.to_string(),
                step.phase.as_str().to_string(),
                step.user_input.clone().unwrap_or_default(),
                store.recommendations_for_step(step.id).len().to_string(),
                store.actions_for_step(step.id).len().to_string(),
                step.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]);
        }
        ui.message(&table.render());

        if ui.output_mode().shows_details() {
            for step in steps {
                for recommendation in store.recommendations_for_step(step.id) {
                    ui.message(&format!(
                        "Recommendation {} (step {}):",
                        recommendation.id, step.id
                    ));
                    ui.message(&strip_markdown(&recommendation.raw_response));
                }
                for action in store.actions_for_step(step.id) {
                    let comment = action.comment.as_deref().unwrap_or("");
                    ui.message(&format!(
                        "Action {} on step {}: {} {}",
                        action.id, step.id, action.action_type, comment
                    ));
                }
            }
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{client_for, session_json};
    use crate::ui::{MockUI, OutputMode};
    use httpmock::prelude::*;
    use serde_json::json;

    fn mock_history(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/sessions/3");
            then.status(200).json_body(session_json(3, Some("1. Explain")));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/steps/")
                .query_param("session_id", "3");
            then.status(200).json_body(json!([{
                "id": 8,
                "session_id": 3,
                "phase": "objective-analysis",
                "user_input": "1. Explain",
                "created_at": "2025-03-01T11:00:00"
            }]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/recommendations/")
                .query_param("step_id", "8");
            then.status(200).json_body(json!([{
                "id": 9,
                "step_id": 8,
                "phase": "objective-analysis",
                "raw_response": "{\"overall_assessment\": \"Good\"}",
                "created_at": "2025-03-01T11:00:01"
            }]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/actions/")
                .query_param("step_id", "8");
            then.status(200).json_body(json!([{
                "id": 10,
                "step_id": 8,
                "recommendation_id": 9,
                "action_type": "accept",
                "created_at": "2025-03-01T11:02:00"
            }]));
        });
    }

    #[test]
    fn lists_steps_with_counts() {
        let server = MockServer::start();
        mock_history(&server);
        let mut ui = MockUI::new();

        let result = StepsCommand::new(client_for(&server), StepsArgs { session_id: 3 })
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        let output = ui.output();
        assert!(output.contains("objective-analysis"));
        assert!(output.contains("2025-03-01 11:00"));
        assert!(!output.contains("Recommendation 9"));
    }

    #[test]
    fn verbose_mode_prints_raw_history() {
        let server = MockServer::start();
        mock_history(&server);
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        StepsCommand::new(client_for(&server), StepsArgs { session_id: 3 })
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("Recommendation 9 (step 8):"));
        assert!(ui.has_message("Action 10 on step 8: accept"));
    }

    #[test]
    fn empty_session_hints_at_analyze() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/sessions/3");
            then.status(200).json_body(session_json(3, None));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/steps/");
            then.status(200).json_body(json!([]));
        });
        let mut ui = MockUI::new();

        StepsCommand::new(client_for(&server), StepsArgs { session_id: 3 })
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("no design steps"));
        assert!(ui.has_hint("id-dss analyze 3"));
    }
}
