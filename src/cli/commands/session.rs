//! Session commands: create, update, show and list.
//!
//! `session create` prompts for any course context field not given as a
//! flag. The prompting helpers here are shared with the guided flow.

use crate::api::{ApiClient, SessionApi};
use crate::cli::args::{CourseContextArgs, SessionCreateArgs, SessionShowArgs, SessionUpdateArgs};
use crate::error::Result;
use crate::model::{CourseContextForm, Phase};
use crate::text::format_objectives;
use crate::ui::{Prompt, PromptOption, Table, UserInterface};
use crate::workflow::Workflow;

use super::dispatcher::{Command, CommandResult};
use super::display;
use super::generation::hint_action;

/// Education levels offered when prompting.
pub const LEVELS: &[&str] = &["undergraduate", "graduate", "professional"];

/// Delivery modalities offered when prompting.
pub const MODALITIES: &[&str] = &["online", "in-person", "hybrid"];

/// Upper bound on objectives entered one prompt at a time.
const MAX_OBJECTIVES: usize = 20;

fn choose(
    ui: &mut dyn UserInterface,
    key: &str,
    question: &str,
    choices: &[&str],
) -> Result<String> {
    let options = choices
        .iter()
        .map(|choice| PromptOption::new(*choice, *choice))
        .collect();
    let prompt = Prompt::select(key, question, options).with_default(choices[0]);
    Ok(ui.prompt(&prompt)?.as_string())
}

/// Ask for learning objectives one at a time until a blank answer.
///
/// Only interactive UIs are asked; elsewhere objectives come from flags.
pub fn prompt_objectives(ui: &mut dyn UserInterface) -> Result<String> {
    if !ui.is_interactive() {
        return Ok(String::new());
    }
    let mut items = Vec::new();
    while items.len() < MAX_OBJECTIVES {
        let question = format!("Objective {} (blank to finish)", items.len() + 1);
        let prompt = Prompt::input("objective", &question).with_default("");
        let answer = ui.prompt(&prompt)?.as_string();
        if answer.trim().is_empty() {
            break;
        }
        items.push(answer.trim().to_string());
    }
    Ok(format_objectives(&items))
}

/// Build a course context form from flags, prompting for what is missing.
pub fn complete_form(
    ui: &mut dyn UserInterface,
    args: &CourseContextArgs,
) -> Result<CourseContextForm> {
    let course_title = match &args.title {
        Some(title) => title.clone(),
        None => ui
            .prompt(&Prompt::input("course_title", "Course title"))?
            .as_string(),
    };
    let level = match &args.level {
        Some(level) => level.clone(),
        None => choose(ui, "level", "Education level", LEVELS)?,
    };
    let modality = match &args.modality {
        Some(modality) => modality.clone(),
        None => choose(ui, "modality", "Delivery modality", MODALITIES)?,
    };
    let constraints = match &args.constraints {
        Some(constraints) => constraints.clone(),
        None => ui
            .prompt(&Prompt::input("constraints", "Constraints (optional)").with_default(""))?
            .as_string(),
    };
    let learning_objectives = match &args.objectives {
        Some(objectives) => objectives.clone(),
        None => prompt_objectives(ui)?,
    };

    Ok(CourseContextForm {
        course_title,
        level,
        modality,
        constraints,
        learning_objectives,
    })
}

/// Overwrite the fields of `form` that were given as flags.
fn apply_args(form: &mut CourseContextForm, args: &CourseContextArgs) {
    let fields = [
        (&mut form.course_title, &args.title),
        (&mut form.level, &args.level),
        (&mut form.modality, &args.modality),
        (&mut form.constraints, &args.constraints),
        (&mut form.learning_objectives, &args.objectives),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            *field = value.clone();
        }
    }
}

/// `id-dss session create`.
pub struct SessionCreateCommand {
    api: ApiClient,
    args: SessionCreateArgs,
}

impl SessionCreateCommand {
    pub fn new(api: ApiClient, args: SessionCreateArgs) -> Self {
        Self { api, args }
    }
}

impl Command for SessionCreateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let form = complete_form(ui, &self.args.context)?;
        if let Err(e) = form.validate() {
            ui.error(&e.user_message());
            return Ok(CommandResult::failure(2));
        }

        let mut workflow = Workflow::new(self.api.clone());
        let mut spinner = ui.start_spinner("Creating session...");
        match workflow.start_session(&form) {
            Ok(session) => {
                spinner.finish_success(&format!("Created session {}", session.id));
                display::show_session(ui, &session);
                ui.show_hint(&format!("Next: id-dss analyze {}", session.id));
                Ok(CommandResult::success())
            }
            Err(e) => {
                spinner.finish_error(&e.user_message());
                Ok(CommandResult::failure(1))
            }
        }
    }
}

/// `id-dss session update`.
pub struct SessionUpdateCommand {
    api: ApiClient,
    args: SessionUpdateArgs,
}

impl SessionUpdateCommand {
    pub fn new(api: ApiClient, args: SessionUpdateArgs) -> Self {
        Self { api, args }
    }
}

impl Command for SessionUpdateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let session = self.api.get_session(self.args.session_id)?;

        let mut form = CourseContextForm::from_session(&session);
        apply_args(&mut form, &self.args.context);
        if let Err(e) = form.validate() {
            ui.error(&e.user_message());
            return Ok(CommandResult::failure(2));
        }

        let patch = form.diff_against(&session);
        if patch.is_empty() {
            ui.message("Nothing to update.");
            return Ok(CommandResult::success());
        }

        let mut spinner = ui.start_spinner("Saving session...");
        match self.api.update_session(session.id, &patch) {
            Ok(updated) => {
                spinner.finish_success(&format!("Updated session {}", updated.id));
                display::show_session(ui, &updated);
                Ok(CommandResult::success())
            }
            Err(e) => {
                spinner.finish_error(&e.user_message());
                Ok(CommandResult::failure(1))
            }
        }
    }
}

/// `id-dss session show`.
pub struct SessionShowCommand {
    api: ApiClient,
    args: SessionShowArgs,
}

impl SessionShowCommand {
    pub fn new(api: ApiClient, args: SessionShowArgs) -> Self {
        Self { api, args }
    }
}

impl Command for SessionShowCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut workflow = Workflow::new(self.api.clone());
        let session = workflow.resume_session(self.args.session_id)?;
        display::show_session(ui, &session);

        let state = workflow.store().state();
        ui.message(&format!(
            "History: {} steps, {} recommendations, {} actions",
            state.design_steps.len(),
            state.recommendations.len(),
            state.user_actions.len()
        ));

        if let Some(analysis) = &state.objective_analysis {
            display::show_objective_analysis(ui, analysis);
        }
        if !state.activity_suggestions.is_empty() {
            display::show_activities(ui, &state.activity_suggestions);
            hint_action(ui, workflow.store(), &Phase::ActivitySuggestion);
        }
        if let Some(plan) = &state.assessment_plan {
            display::show_assessment_plan(ui, plan);
        }
        ui.show_hint(&format!(
            "Export the design: id-dss export {} --format plan",
            session.id
        ));
        Ok(CommandResult::success())
    }
}

/// `id-dss session list`.
pub struct SessionListCommand {
    api: ApiClient,
}

impl SessionListCommand {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl Command for SessionListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let sessions = self.api.list_sessions()?;
        if sessions.is_empty() {
            ui.message("No sessions yet.");
            ui.show_hint("Start one with: id-dss session create");
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["ID", "Course", "Level", "Modality", "Created"]);
        for session in &sessions {
            table.add_row(&[
                session.id.to_string(),
                session.course_title.clone(),
                session.level.clone(),
                session.modality.clone(),
                session.created_at.format("%Y-%m-%d").to_string(),
            ]);
        }
        ui.message(&table.render());
        Ok(CommandResult::success())
    }
}
