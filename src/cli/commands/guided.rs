//! Guided design flow.
//!
//! `id-dss guided` (and `id-dss` with no subcommand) walks one session
//! through the five design stages:
//!
//! 1. Course context: create a session or resume one
//! 2. Objective analysis: review objectives, analyze them, adopt suggestions
//! 3. Activity suggestions: pick which suggested activities to keep
//! 4. Assessment recommendations for the kept activities
//! 5. Summary: export the design
//!
//! Every remote failure is shown where it happened and the user is offered
//! a retry. Declining skips that stage; nothing is fatal after the session
//! exists.

use std::path::PathBuf;

use crate::api::{ApiClient, SessionApi};
use crate::cli::args::{CourseContextArgs, GuidedArgs};
use crate::error::Result;
use crate::model::{ActionType, ActivityItem, Phase, Session};
use crate::store::StoreEvent;
use crate::text::strip_markdown;
use crate::ui::{Prompt, PromptOption, UserInterface};
use crate::workflow::{ExportTarget, GenerationOutcome, Workflow};

use super::dispatcher::{Command, CommandResult};
use super::display;
use super::generation::{generate, latest_ids};
use super::session::{complete_form, prompt_objectives};

const STAGES: usize = 5;

type ApiWorkflow = Workflow<ApiClient>;

fn confirm(ui: &mut dyn UserInterface, key: &str, question: &str, default: bool) -> Result<bool> {
    let answer = ui.prompt(&Prompt::confirm(key, question, default))?;
    Ok(answer.as_bool().unwrap_or(default))
}

/// Run `op` until it succeeds or the user declines a retry.
///
/// `op` reports its own failure; `Ok(None)` means the user gave up.
fn attempt<T>(
    ui: &mut dyn UserInterface,
    retry_key: &str,
    mut op: impl FnMut(&mut dyn UserInterface) -> Result<T>,
) -> Result<Option<T>> {
    loop {
        match op(&mut *ui) {
            Ok(value) => return Ok(Some(value)),
            Err(e) => {
                tracing::debug!("Guided step failed: {}", e);
                if !confirm(ui, retry_key, "Try again?", false)? {
                    return Ok(None);
                }
            }
        }
    }
}

fn stage(ui: &mut dyn UserInterface, number: usize, phase: Phase) {
    ui.show_progress(number, STAGES);
    ui.show_header(phase.label());
}

/// Record a decision on the newest result of a phase. Failures only warn.
fn record(
    ui: &mut dyn UserInterface,
    workflow: &mut ApiWorkflow,
    ids: Option<(i64, i64)>,
    action_type: ActionType,
    comment: Option<String>,
) {
    let Some((step_id, recommendation_id)) = ids else {
        return;
    };
    if let Err(e) = workflow.record_action(
        step_id,
        Some(recommendation_id),
        action_type,
        None,
        comment,
    ) {
        ui.warning(&format!("Could not record your decision: {}", e.user_message()));
    }
}

/// The guided command implementation.
pub struct GuidedCommand {
    api: ApiClient,
    args: GuidedArgs,
    export_dir: PathBuf,
}

impl GuidedCommand {
    /// Create a new guided command exporting into `export_dir`.
    pub fn new(api: ApiClient, args: GuidedArgs, export_dir: PathBuf) -> Self {
        Self {
            api,
            args,
            export_dir,
        }
    }

    fn check_backend(&self, ui: &mut dyn UserInterface) {
        match self.api.llm_status() {
            Ok(status) if status.configured => {
                tracing::debug!("AI backend ready: {} {}", status.provider, status.model);
            }
            Ok(status) => ui.warning(&format!(
                "The AI backend is not configured; AI steps will fail. {}",
                status.message
            )),
            Err(e) => ui.warning(&format!(
                "Could not check the AI backend: {}",
                e.user_message()
            )),
        }
    }

    fn open_session(
        &self,
        ui: &mut dyn UserInterface,
        workflow: &mut ApiWorkflow,
    ) -> Result<Option<Session>> {
        if let Some(session_id) = self.args.resume {
            let mut spinner = ui.start_spinner(&format!("Loading session {}...", session_id));
            return match workflow.resume_session(session_id) {
                Ok(session) => {
                    spinner.finish_success("Session loaded");
                    Ok(Some(session))
                }
                Err(e) => {
                    spinner.finish_error(&e.user_message());
                    Ok(None)
                }
            };
        }

        let form = complete_form(ui, &CourseContextArgs::default())?;
        if let Err(e) = form.validate() {
            ui.error(&e.user_message());
            return Ok(None);
        }
        attempt(ui, "retry_create", |ui| {
            let mut spinner = ui.start_spinner("Creating session...");
            let created = workflow.start_session(&form);
            match &created {
                Ok(session) => spinner.finish_success(&format!("Created session {}", session.id)),
                Err(e) => spinner.finish_error(&e.user_message()),
            }
            created
        })
    }

    fn save_objectives(&self, ui: &mut dyn UserInterface, workflow: &mut ApiWorkflow) -> Result<()> {
        if !workflow.objectives().is_dirty() {
            return Ok(());
        }
        if !confirm(ui, "save_objectives", "Save these objectives to the session?", true)? {
            workflow.discard_objectives();
            ui.message("Kept the saved objectives.");
            return Ok(());
        }
        let saved = attempt(ui, "retry_save", |ui| {
            let mut spinner = ui.start_spinner("Saving objectives...");
            let result = workflow.save_objectives();
            match &result {
                Ok(_) => spinner.finish_success("Objectives saved"),
                Err(e) => spinner.finish_error(&e.user_message()),
            }
            result
        })?;
        if saved.is_none() {
            ui.warning("Objectives were not saved; continuing with your draft.");
        }
        Ok(())
    }

    fn review_objectives(&self, ui: &mut dyn UserInterface, workflow: &mut ApiWorkflow) -> Result<()> {
        if workflow.objectives().draft().trim().is_empty() {
            ui.message("This session has no learning objectives yet.");
            let text = prompt_objectives(ui)?;
            if !text.is_empty() {
                workflow.edit_objectives(text);
            }
        } else {
            display::show_objectives(ui, workflow.objectives().draft());
            if confirm(ui, "edit_objectives", "Rewrite the learning objectives?", false)? {
                let text = prompt_objectives(ui)?;
                if !text.is_empty() {
                    workflow.edit_objectives(text);
                }
            }
        }
        self.save_objectives(ui, workflow)
    }

    fn analysis_stage(&self, ui: &mut dyn UserInterface, workflow: &mut ApiWorkflow) -> Result<()> {
        self.review_objectives(ui, workflow)?;
        let objectives = workflow.objectives().draft().clone();
        if objectives.trim().is_empty() {
            ui.warning("No learning objectives; skipping the AI steps that need them.");
            return Ok(());
        }
        if !confirm(ui, "run_analysis", "Analyze the objectives with AI?", true)? {
            return Ok(());
        }

        let Some(outcome) = attempt(ui, "retry_analysis", |ui| {
            generate(ui, "Analyzing objectives...", "Analysis ready", || {
                workflow.run_objective_analysis(&objectives)
            })
        })?
        else {
            return Ok(());
        };
        display::show_outcome_notice(ui, &outcome);
        if outcome == GenerationOutcome::Stale {
            return Ok(());
        }

        let improved: Vec<String> = match &workflow.store().state().objective_analysis {
            Some(payload) => {
                display::show_objective_analysis(ui, payload);
                payload
                    .parsed()
                    .map(|analysis| {
                        analysis
                            .improved_objectives
                            .iter()
                            .map(|item| strip_markdown(item))
                            .collect()
                    })
                    .unwrap_or_default()
            }
            None => Vec::new(),
        };
        if improved.iter().all(|item| item.is_empty()) {
            return Ok(());
        }

        let ids = latest_ids(workflow.store(), &Phase::ObjectiveAnalysis);
        if confirm(ui, "adopt_improved", "Use the improved objectives?", false)? {
            workflow.adopt_improved_objectives(&improved);
            display::show_objectives(ui, workflow.objectives().draft());
            record(ui, workflow, ids, ActionType::Accept, None);
            self.save_objectives(ui, workflow)?;
        }
        Ok(())
    }

    /// Returns the activities to plan assessments for.
    fn activities_stage(
        &self,
        ui: &mut dyn UserInterface,
        workflow: &mut ApiWorkflow,
    ) -> Result<Vec<ActivityItem>> {
        let objectives = workflow.objectives().draft().clone();
        if objectives.trim().is_empty() {
            return Ok(Vec::new());
        }
        if !confirm(ui, "run_activities", "Suggest learning activities?", true)? {
            return Ok(Vec::new());
        }

        let Some(outcome) = attempt(ui, "retry_activities", |ui| {
            generate(ui, "Suggesting activities...", "Activities ready", || {
                workflow.run_activity_suggestion(&objectives)
            })
        })?
        else {
            return Ok(Vec::new());
        };
        match &outcome {
            GenerationOutcome::Applied => {}
            GenerationOutcome::Malformed { raw_response } => {
                display::show_malformed(ui, raw_response);
                return Ok(Vec::new());
            }
            GenerationOutcome::Stale => {
                display::show_outcome_notice(ui, &outcome);
                return Ok(Vec::new());
            }
        }

        let activities = workflow.store().state().activity_suggestions.clone();
        display::show_activities(ui, &activities);
        if activities.is_empty() {
            return Ok(activities);
        }

        let options = activities
            .iter()
            .enumerate()
            .map(|(index, activity)| {
                let label = Some(strip_markdown(&activity.title))
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| format!("Activity {}", index + 1));
                PromptOption::new(label, activity.id.clone().unwrap_or_default())
            })
            .collect();
        let chosen = ui
            .prompt(
                &Prompt::multi_select(
                    "keep_activities",
                    "Which activities do you want to keep?",
                    options,
                )
                .with_default(""),
            )?
            .as_strings();
        if chosen.is_empty() {
            ui.message("No activities picked; every suggestion stays in the plan.");
            return Ok(activities);
        }

        let ids = latest_ids(workflow.store(), &Phase::ActivitySuggestion);
        for activity in &activities {
            let id = activity.id.clone().unwrap_or_default();
            let action_type = if chosen.contains(&id) {
                ActionType::Accept
            } else {
                ActionType::Reject
            };
            record(ui, workflow, ids, action_type, Some(id));
        }
        Ok(activities
            .into_iter()
            .filter(|activity| activity.id.as_ref().is_some_and(|id| chosen.contains(id)))
            .collect())
    }

    fn assessment_stage(
        &self,
        ui: &mut dyn UserInterface,
        workflow: &mut ApiWorkflow,
        activities: &[ActivityItem],
    ) -> Result<()> {
        if activities.is_empty() {
            ui.message("No activities to assess; skipping assessments.");
            return Ok(());
        }
        if !confirm(ui, "run_assessments", "Recommend assessments for these activities?", true)? {
            return Ok(());
        }

        let objectives = workflow.objectives().draft().clone();
        let activities = display::activities_as_text(activities);
        let Some(outcome) = attempt(ui, "retry_assessments", |ui| {
            generate(ui, "Recommending assessments...", "Assessment plan ready", || {
                workflow.run_assessment_recommendation(&objectives, &activities)
            })
        })?
        else {
            return Ok(());
        };
        display::show_outcome_notice(ui, &outcome);
        if outcome != GenerationOutcome::Stale {
            if let Some(plan) = &workflow.store().state().assessment_plan {
                display::show_assessment_plan(ui, plan);
            }
        }
        Ok(())
    }

    fn export_stage(&self, ui: &mut dyn UserInterface, workflow: &mut ApiWorkflow) -> Result<()> {
        let options = vec![
            PromptOption::new("Text plan", "plan"),
            PromptOption::new("JSON snapshot", "json"),
            PromptOption::new("Word document", "docx"),
            PromptOption::new("PDF", "pdf"),
            PromptOption::new("Don't export", "skip"),
        ];
        let choice = ui
            .prompt(&Prompt::select("export_format", "Export the design?", options).with_default("plan"))?
            .as_string();
        if choice == "skip" {
            return Ok(());
        }

        let target: ExportTarget = choice.parse()?;
        let dir = self.export_dir.clone();
        attempt(ui, "retry_export", |ui| {
            let mut spinner = ui.start_spinner("Exporting design...");
            let result = workflow.export(target, &dir);
            match &result {
                Ok(path) => spinner.finish_success(&format!("Saved {}", path.display())),
                Err(e) => spinner.finish_error(&e.user_message()),
            }
            result
        })?;
        Ok(())
    }
}

impl Command for GuidedCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut workflow = Workflow::new(self.api.clone());
        workflow.store_mut().subscribe(Box::new(|event: &StoreEvent| {
            tracing::debug!("Store changed: {:?}", event);
        }));

        ui.show_header("Instructional Design Session");
        self.check_backend(ui);

        stage(ui, 1, Phase::Context);
        let Some(session) = self.open_session(ui, &mut workflow)? else {
            return Ok(CommandResult::failure(1));
        };
        display::show_session(ui, &session);

        stage(ui, 2, Phase::ObjectiveAnalysis);
        self.analysis_stage(ui, &mut workflow)?;

        stage(ui, 3, Phase::ActivitySuggestion);
        let activities = self.activities_stage(ui, &mut workflow)?;

        stage(ui, 4, Phase::AssessmentRecommendation);
        self.assessment_stage(ui, &mut workflow, &activities)?;

        stage(ui, 5, Phase::Summary);
        self.export_stage(ui, &mut workflow)?;

        ui.success(&format!("Design session {} complete", session.id));
        ui.show_hint(&format!("Review it any time: id-dss session show {}", session.id));
        Ok(CommandResult::success())
    }
}
