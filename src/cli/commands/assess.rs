//! Assess command implementation.
//!
//! Without `--activities` the latest suggested activities of the session
//! are used, minus any the user rejected.

use crate::api::ApiClient;
use crate::cli::args::AssessArgs;
use crate::error::Result;
use crate::model::{ActionType, ActivityItem, Phase};
use crate::store::SessionStore;
use crate::ui::UserInterface;
use crate::workflow::{GenerationOutcome, Workflow};

use super::dispatcher::{Command, CommandResult};
use super::display;
use super::generation::{generate, hint_action, objectives_for};

/// Latest suggested activities that were not rejected.
pub fn kept_activities(store: &SessionStore) -> Vec<ActivityItem> {
    let rejected: Vec<String> = store
        .latest_step_for_phase(&Phase::ActivitySuggestion)
        .map(|step| {
            store
                .actions_for_step(step.id)
                .into_iter()
                .filter(|action| action.action_type == ActionType::Reject)
                .filter_map(|action| action.comment.as_deref().map(|c| c.trim().to_string()))
                .collect()
        })
        .unwrap_or_default();

    store
        .state()
        .activity_suggestions
        .iter()
        .filter(|activity| {
            activity
                .id
                .as_ref()
                .map_or(true, |id| !rejected.contains(id))
        })
        .cloned()
        .collect()
}

/// The assess command implementation.
pub struct AssessCommand {
    api: ApiClient,
    args: AssessArgs,
}

impl AssessCommand {
    /// Create a new assess command.
    pub fn new(api: ApiClient, args: AssessArgs) -> Self {
        Self { api, args }
    }
}

impl Command for AssessCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut workflow = Workflow::new(self.api.clone());
        let activities = match &self.args.activities {
            Some(activities) => {
                workflow.open_session(self.args.session_id)?;
                activities.clone()
            }
            None => {
                workflow.resume_session(self.args.session_id)?;
                display::activities_as_text(&kept_activities(workflow.store()))
            }
        };
        if activities.trim().is_empty() {
            ui.error("No activities to assess.");
            ui.show_hint(&format!(
                "Pass --activities or run: id-dss activities {}",
                self.args.session_id
            ));
            return Ok(CommandResult::failure(2));
        }

        let objectives = match objectives_for(&workflow, self.args.objectives.as_deref()) {
            Ok(objectives) => objectives,
            Err(e) => {
                ui.error(&e.user_message());
                return Ok(CommandResult::failure(2));
            }
        };

        let outcome = match generate(
            ui,
            "Recommending assessments...",
            "Assessment plan ready",
            || workflow.run_assessment_recommendation(&objectives, &activities),
        ) {
            Ok(outcome) => outcome,
            Err(_) => return Ok(CommandResult::failure(1)),
        };

        display::show_outcome_notice(ui, &outcome);
        if outcome != GenerationOutcome::Stale {
            if let Some(plan) = &workflow.store().state().assessment_plan {
                display::show_assessment_plan(ui, plan);
            }
        }
        hint_action(ui, workflow.store(), &Phase::AssessmentRecommendation);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{client_for, envelope_json, session_json};
    use crate::ui::MockUI;
    use httpmock::prelude::*;
    use serde_json::json;

    fn mock_history(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/sessions/6");
            then.status(200).json_body(session_json(6, Some("1. Explain")));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/steps/")
                .query_param("session_id", "6");
            then.status(200).json_body(json!([{
                "id": 30,
                "session_id": 6,
                "phase": "activity-suggestion",
                "created_at": "2025-03-01T12:00:00"
            }]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/recommendations/")
                .query_param("step_id", "30");
            then.status(200).json_body(json!([{
                "id": 31,
                "step_id": 30,
                "phase": "activity-suggestion",
                "raw_response": json!({"activities": [
                    {"title": "Lab", "description": "Fit a line"},
                    {"title": "Quiz"}
                ]}).to_string(),
                "created_at": "2025-03-01T12:00:01"
            }]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/actions/")
                .query_param("step_id", "30");
            then.status(200).json_body(json!([{
                "id": 32,
                "step_id": 30,
                "recommendation_id": 31,
                "action_type": "reject",
                "comment": "activity-1",
                "created_at": "2025-03-01T12:01:00"
            }]));
        });
    }

    #[test]
    fn uses_kept_activities_when_none_given() {
        let server = MockServer::start();
        mock_history(&server);
        let recommend = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/llm/recommend-assessments")
                .json_body(json!({
                    "session_id": 6,
                    "objectives": "1. Explain",
                    "activities": "- Lab: Fit a line"
                }));
            then.status(200).json_body(envelope_json(
                33,
                34,
                json!({
                    "assessments": [{"title": "Regression report", "type": "summative"}],
                    "assessment_strategy_rationale": "Mix formative and summative"
                }),
            ));
        });
        let mut ui = MockUI::new();

        let result = AssessCommand::new(
            client_for(&server),
            AssessArgs {
                session_id: 6,
                objectives: None,
                activities: None,
            },
        )
        .execute(&mut ui)
        .unwrap();

        recommend.assert();
        assert!(result.success);
        assert!(ui.has_message("1. Regression report (summative)"));
        assert!(ui.has_hint("id-dss action 33 accept --recommendation 34"));
    }

    #[test]
    fn explicit_activities_skip_history() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/sessions/6");
            then.status(200).json_body(session_json(6, None));
        });
        let steps = server.mock(|when, then| {
            when.method(GET).path("/api/v1/steps/");
            then.status(200).json_body(json!([]));
        });
        let recommend = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/llm/recommend-assessments")
                .json_body(json!({
                    "session_id": 6,
                    "objectives": "Explain",
                    "activities": "Lecture"
                }));
            then.status(200)
                .json_body(envelope_json(40, 41, json!({"assessments": []})));
        });
        let mut ui = MockUI::new();

        let result = AssessCommand::new(
            client_for(&server),
            AssessArgs {
                session_id: 6,
                objectives: Some("Explain".to_string()),
                activities: Some("Lecture".to_string()),
            },
        )
        .execute(&mut ui)
        .unwrap();

        assert!(result.success);
        recommend.assert();
        steps.assert_calls(0);
    }

    #[test]
    fn no_activities_fails_with_hint() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/sessions/6");
            then.status(200).json_body(session_json(6, Some("Explain")));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/steps/");
            then.status(200).json_body(json!([]));
        });
        let mut ui = MockUI::new();

        let result = AssessCommand::new(
            client_for(&server),
            AssessArgs {
                session_id: 6,
                objectives: None,
                activities: None,
            },
        )
        .execute(&mut ui)
        .unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_hint("id-dss activities 6"));
    }
}
