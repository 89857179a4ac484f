//! Shared display helpers for sessions and AI results.
//!
//! Every command that shows a session, an analysis, activities or
//! assessments goes through these so the terminal output stays uniform.
//! AI text is markdown-stripped before it is printed.

use crate::model::{
    ActivityItem, AiPayload, AssessmentResponse, ObjectiveAnalysisResponse, Session,
};
use crate::text::{parse_objectives, strip_markdown};
use crate::ui::UserInterface;
use crate::workflow::GenerationOutcome;

/// Print the course context of a session.
pub fn show_session(ui: &mut dyn UserInterface, session: &Session) {
    ui.show_header(&format!("{} (session {})", session.course_title, session.id));
    ui.message(&format!("Level: {}", session.level));
    ui.message(&format!("Modality: {}", session.modality));
    if let Some(constraints) = session.constraints.as_deref().filter(|c| !c.trim().is_empty()) {
        ui.message(&format!("Constraints: {}", constraints.trim()));
    }
    ui.message(&format!(
        "Created: {}",
        session.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    show_objectives(ui, session.learning_objectives.as_deref().unwrap_or(""));
}

/// Print learning objectives as a numbered list.
pub fn show_objectives(ui: &mut dyn UserInterface, text: &str) {
    let items = parse_objectives(text);
    if items.is_empty() {
        ui.message("Learning objectives: (none yet)");
        return;
    }
    ui.message("Learning objectives:");
    for (index, item) in items.iter().enumerate() {
        ui.message(&format!("  {}. {}", index + 1, item));
    }
}

fn list(ui: &mut dyn UserInterface, label: &str, items: &[String]) {
    let items: Vec<String> = items
        .iter()
        .map(|item| strip_markdown(item))
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        return;
    }
    ui.message(label);
    for item in items {
        ui.message(&format!("  - {}", item));
    }
}

fn text(ui: &mut dyn UserInterface, label: &str, value: &str) {
    let value = strip_markdown(value);
    if value.is_empty() {
        return;
    }
    if label.is_empty() {
        ui.message(&value);
    } else {
        ui.message(&format!("{} {}", label, value));
    }
}

/// Say that a response could not be parsed and print its raw text.
pub fn show_malformed(ui: &mut dyn UserInterface, raw_response: &str) {
    ui.warning("The AI response could not be parsed; showing it as returned.");
    ui.message(raw_response.trim());
}

/// Print an objective analysis.
pub fn show_objective_analysis(
    ui: &mut dyn UserInterface,
    payload: &AiPayload<ObjectiveAnalysisResponse>,
) {
    let analysis = match payload {
        AiPayload::Parsed(analysis) => analysis,
        AiPayload::Malformed { raw_response } => return show_malformed(ui, raw_response),
    };

    ui.show_header("Objective Analysis");
    text(ui, "", &analysis.overall_assessment);
    if !analysis.bloom_analysis.is_empty() {
        ui.message("Bloom's taxonomy:");
        for item in &analysis.bloom_analysis {
            ui.message(&format!(
                "  - {} [{}]",
                strip_markdown(&item.objective),
                strip_markdown(&item.current_level)
            ));
            let suggestion = strip_markdown(&item.suggestion);
            if !suggestion.is_empty() {
                ui.message(&format!("    {}", suggestion));
            }
        }
    }
    text(ui, "Alignment:", &analysis.alignment_notes);
    list(ui, "Missing coverage:", &analysis.missing_coverage);
    list(ui, "Improved objectives:", &analysis.improved_objectives);
}

/// Print suggested activities with the ids used to act on them.
pub fn show_activities(ui: &mut dyn UserInterface, activities: &[ActivityItem]) {
    ui.show_header("Suggested Activities");
    if activities.is_empty() {
        ui.message("No activities were suggested.");
        return;
    }
    for (index, activity) in activities.iter().enumerate() {
        let title = Some(strip_markdown(&activity.title))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Activity {}", index + 1));
        let meta: Vec<&str> = [activity.activity_type.as_str(), activity.duration.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        let id = activity.id.as_deref().unwrap_or("");
        if meta.is_empty() {
            ui.message(&format!("[{}] {}", id, title));
        } else {
            ui.message(&format!("[{}] {} ({})", id, title, meta.join(", ")));
        }
        text(ui, "   ", &activity.description);
        list(ui, "   Aligns with:", &activity.objective_alignment);
        list(ui, "   Materials:", &activity.materials_needed);
    }
}

/// Print an assessment plan.
pub fn show_assessment_plan(ui: &mut dyn UserInterface, payload: &AiPayload<AssessmentResponse>) {
    let plan = match payload {
        AiPayload::Parsed(plan) => plan,
        AiPayload::Malformed { raw_response } => return show_malformed(ui, raw_response),
    };

    ui.show_header("Recommended Assessments");
    text(ui, "", &plan.assessment_strategy_rationale);
    text(ui, "Balance:", &plan.formative_summative_balance);
    for (index, assessment) in plan.assessments.iter().enumerate() {
        let title = Some(strip_markdown(&assessment.title))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Assessment {}", index + 1));
        let meta: Vec<&str> = [
            assessment.assessment_type.as_str(),
            assessment.timing.as_str(),
            assessment.weight.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
        if meta.is_empty() {
            ui.message(&format!("{}. {}", index + 1, title));
        } else {
            ui.message(&format!("{}. {} ({})", index + 1, title, meta.join(", ")));
        }
        text(ui, "   ", &assessment.description);
        list(ui, "   Rubric:", &assessment.rubric_criteria);
    }
}

/// Report what happened to a generation response that was not applied.
pub fn show_outcome_notice(ui: &mut dyn UserInterface, outcome: &GenerationOutcome) {
    if let GenerationOutcome::Stale = outcome {
        ui.warning("A newer request replaced this result; it was kept in history only.");
    }
}

/// Activities as plain text, the form the assessment endpoint expects.
pub fn activities_as_text(activities: &[ActivityItem]) -> String {
    activities
        .iter()
        .enumerate()
        .map(|(index, activity)| {
            let title = if activity.title.is_empty() {
                format!("Activity {}", index + 1)
            } else {
                strip_markdown(&activity.title)
            };
            let description = strip_markdown(&activity.description);
            if description.is_empty() {
                format!("- {}", title)
            } else {
                format!("- {}: {}", title, description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
