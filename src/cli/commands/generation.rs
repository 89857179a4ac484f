//! Helpers shared by the commands that call the AI endpoints.

use crate::api::SessionApi;
use crate::error::{IdDssError, Result};
use crate::model::Phase;
use crate::store::SessionStore;
use crate::ui::UserInterface;
use crate::workflow::{GenerationOutcome, Workflow};

/// Run one generation request behind a spinner.
///
/// The spinner finishes according to the outcome. Errors are reported on
/// the spinner and returned unchanged.
pub fn generate(
    ui: &mut dyn UserInterface,
    message: &str,
    ready: &str,
    request: impl FnOnce() -> Result<GenerationOutcome>,
) -> Result<GenerationOutcome> {
    let mut spinner = ui.start_spinner(message);
    match request() {
        Ok(outcome) => {
            match &outcome {
                GenerationOutcome::Applied => spinner.finish_success(ready),
                GenerationOutcome::Malformed { .. } => {
                    spinner.finish_skipped("Response was not in the expected format")
                }
                GenerationOutcome::Stale => spinner.finish_skipped("Superseded by a newer request"),
            }
            Ok(outcome)
        }
        Err(e) => {
            spinner.finish_error(&e.user_message());
            Err(e)
        }
    }
}

/// Step and recommendation ids of the newest result for `phase`.
pub fn latest_ids(store: &SessionStore, phase: &Phase) -> Option<(i64, i64)> {
    let step = store.latest_step_for_phase(phase)?;
    let recommendation = store.recommendations_for_step(step.id).last().copied()?;
    Some((step.id, recommendation.id))
}

/// Hint at how to record a decision on the newest result for `phase`.
pub fn hint_action(ui: &mut dyn UserInterface, store: &SessionStore, phase: &Phase) {
    if let Some((step_id, recommendation_id)) = latest_ids(store, phase) {
        ui.show_hint(&format!(
            "Record a decision: id-dss action {} accept --recommendation {}",
            step_id, recommendation_id
        ));
    }
}

/// Objectives given on the command line, else the session's saved ones.
pub fn objectives_for<A: SessionApi>(
    workflow: &Workflow<A>,
    explicit: Option<&str>,
) -> Result<String> {
    let objectives = match explicit {
        Some(text) => text.to_string(),
        None => workflow.objectives().draft().clone(),
    };
    if objectives.trim().is_empty() {
        return Err(IdDssError::InvalidForm {
            message: "no learning objectives; pass --objectives or save some with \
                      `id-dss session update`"
                .to_string(),
        });
    }
    Ok(objectives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::mock::SpinnerStatus;
    use crate::ui::MockUI;

    #[test]
    fn applied_outcome_finishes_spinner_with_success() {
        let mut ui = MockUI::new();
        let outcome = generate(&mut ui, "Working...", "Done", || Ok(GenerationOutcome::Applied));

        assert_eq!(outcome.unwrap(), GenerationOutcome::Applied);
        assert_eq!(ui.spinners(), &["Working..."]);
        assert_eq!(
            ui.spinner_finishes(),
            vec![(SpinnerStatus::Success, "Done".to_string())]
        );
    }

    #[test]
    fn malformed_outcome_is_skipped_not_failed() {
        let mut ui = MockUI::new();
        let outcome = generate(&mut ui, "Working...", "Done", || {
            Ok(GenerationOutcome::Malformed {
                raw_response: "text".to_string(),
            })
        });

        assert!(outcome.is_ok());
        assert_eq!(ui.spinner_finishes()[0].0, SpinnerStatus::Skipped);
    }

    #[test]
    fn errors_are_shown_on_the_spinner() {
        let mut ui = MockUI::new();
        let outcome = generate(&mut ui, "Working...", "Done", || {
            Err(IdDssError::Http {
                status: 503,
                detail: "OpenAI API key not configured.".to_string(),
            })
        });

        assert!(outcome.is_err());
        assert_eq!(
            ui.spinner_finishes(),
            vec![(
                SpinnerStatus::Error,
                "OpenAI API key not configured.".to_string()
            )]
        );
    }

    #[test]
    fn latest_ids_need_a_step() {
        assert_eq!(latest_ids(&SessionStore::new(), &Phase::ObjectiveAnalysis), None);
    }
}
