//! Building the plan from an export snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    activity_id, ActionType, ActivityItem, AssessmentItem, AssessmentResponse, ExportAction,
    ExportSnapshot, ObjectiveAnalysisResponse, Phase,
};
use crate::text::{clean_lines, clean_text, strip_markdown};

pub const PLAN_TITLE: &str = "Instructional Design Plan";
pub const ACCEPTED_NOTE: &str = "Included activities you marked as accepted.";
pub const FALLBACK_NOTE: &str =
    "No accepted activities were found; included all non-rejected suggestions.";

/// The user's decision on one suggested activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// Cleaned session fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub course_title: String,
    pub level: String,
    pub modality: String,
    pub constraints: String,
    pub learning_objectives: String,
    pub learning_objectives_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedActivity {
    pub status: ActivityStatus,
    #[serde(flatten)]
    pub activity: ActivityItem,
}

/// Activities that made it into the plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityPlan {
    pub selection_note: String,
    pub sequence_rationale: String,
    pub total_estimated_time: String,
    pub activities: Vec<PlannedActivity>,
}

/// A finished, display-ready design plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalDesign {
    pub title: String,
    pub exported_at: String,
    pub session: SessionSummary,
    pub objective_analysis: Option<ObjectiveAnalysisResponse>,
    pub activity_plan: Option<ActivityPlan>,
    pub assessment_plan: Option<AssessmentResponse>,
}

impl FinalDesign {
    pub fn from_snapshot(snapshot: &ExportSnapshot) -> Self {
        let session = &snapshot.session;
        let objectives = strip_markdown(session.learning_objectives.as_deref().unwrap_or_default());
        Self {
            title: PLAN_TITLE.to_string(),
            exported_at: snapshot.exported_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            session: SessionSummary {
                id: session.id,
                course_title: strip_markdown(&session.course_title),
                level: strip_markdown(&session.level),
                modality: strip_markdown(&session.modality),
                constraints: strip_markdown(session.constraints.as_deref().unwrap_or_default()),
                learning_objectives_lines: clean_lines(&objectives),
                learning_objectives: objectives,
            },
            objective_analysis: final_objective_analysis(snapshot),
            activity_plan: final_activities(snapshot),
            assessment_plan: final_assessments(snapshot),
        }
    }

    /// Plain-text rendering for the terminal or a `.txt` export.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

fn latest_response<'a>(snapshot: &'a ExportSnapshot, phase: &Phase) -> Option<&'a Value> {
    snapshot
        .latest_step(phase)?
        .latest_recommendation()
        .map(|rec| &rec.response)
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| strip_markdown(item))
        .filter(|item| !item.is_empty())
        .collect()
}

fn final_objective_analysis(snapshot: &ExportSnapshot) -> Option<ObjectiveAnalysisResponse> {
    let response = latest_response(snapshot, &Phase::ObjectiveAnalysis)?;
    if !response.is_object() {
        return None;
    }
    let mut analysis = ObjectiveAnalysisResponse::deserialize(response).ok()?;
    analysis.overall_assessment = strip_markdown(&analysis.overall_assessment);
    analysis.alignment_notes = strip_markdown(&analysis.alignment_notes);
    for item in &mut analysis.bloom_analysis {
        item.objective = strip_markdown(&item.objective);
        item.current_level = strip_markdown(&item.current_level);
        item.domain = strip_markdown(&item.domain);
        item.suggestion = strip_markdown(&item.suggestion);
    }
    analysis.improved_objectives = clean_list(&analysis.improved_objectives);
    analysis.missing_coverage = clean_list(&analysis.missing_coverage);
    Some(analysis)
}

/// Parse an object-shaped value into an activity.
fn activity_from_value(value: &Value) -> Option<ActivityItem> {
    value
        .is_object()
        .then(|| ActivityItem::deserialize(value).ok())
        .flatten()
}

fn edited_activity(action: &ExportAction) -> Option<ActivityItem> {
    let raw = action.edited_content.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    activity_from_value(&serde_json::from_str(raw).ok()?)
}

/// Which activity an action refers to.
///
/// Edits carry the activity id inside the edited JSON; accept and reject
/// carry it as the comment.
fn activity_id_of(action: &ExportAction) -> Option<String> {
    if let Some(id) = edited_activity(action).and_then(|activity| activity.id) {
        if !id.is_empty() {
            return Some(id);
        }
    }
    let comment = action.comment.as_deref().unwrap_or_default().trim();
    comment
        .starts_with("activity-")
        .then(|| comment.to_string())
}

#[derive(Default)]
struct Decision {
    status: ActivityStatus,
    edited: Option<ActivityItem>,
}

fn normalize(mut activity: ActivityItem, id: &str, status: ActivityStatus) -> PlannedActivity {
    activity.id = Some(id.to_string());
    activity.title = strip_markdown(&activity.title);
    activity.activity_type = strip_markdown(&activity.activity_type);
    activity.description = strip_markdown(&activity.description);
    activity.duration = strip_markdown(&activity.duration);
    activity.assessment_criteria = strip_markdown(&activity.assessment_criteria);
    activity.objective_alignment = clean_list(&activity.objective_alignment);
    activity.materials_needed = clean_list(&activity.materials_needed);
    activity.instructions = clean_list(&activity.instructions);
    for value in activity.adaptations.values_mut() {
        *value = strip_markdown(value);
    }
    PlannedActivity { status, activity }
}

fn final_activities(snapshot: &ExportSnapshot) -> Option<ActivityPlan> {
    let step = snapshot.latest_step(&Phase::ActivitySuggestion)?;
    let mut plan = ActivityPlan::default();

    let mut base = Vec::new();
    if let Some(response) = latest_response(snapshot, &Phase::ActivitySuggestion) {
        if let Some(items) = response.get("activities").and_then(Value::as_array) {
            for (index, item) in items.iter().enumerate() {
                if let Some(mut activity) = activity_from_value(item) {
                    if activity.id.as_deref().map_or(true, str::is_empty) {
                        activity.id = Some(activity_id(index));
                    }
                    base.push(activity);
                }
            }
        }
        if response.is_object() {
            let text = |key: &str| clean_text(response.get(key).unwrap_or(&Value::Null));
            plan.sequence_rationale = text("sequence_rationale");
            plan.total_estimated_time = text("total_estimated_time");
        }
    }

    // Fold decisions in chronological order, keeping first-seen order of ids.
    let mut actions: Vec<&ExportAction> = step.user_actions.iter().collect();
    actions.sort_by_key(|action| action.created_at);
    let mut decisions: Vec<(String, Decision)> = Vec::new();
    for action in actions {
        let Some(id) = activity_id_of(action) else {
            continue;
        };
        let index = match decisions.iter().position(|(existing, _)| *existing == id) {
            Some(index) => index,
            None => {
                decisions.push((id, Decision::default()));
                decisions.len() - 1
            }
        };
        let decision = &mut decisions[index].1;
        match action.action_type {
            ActionType::Reject => decision.status = ActivityStatus::Rejected,
            ActionType::Accept => decision.status = ActivityStatus::Accepted,
            ActionType::Edit => {
                if let Some(edited) = edited_activity(action) {
                    decision.edited = Some(edited);
                }
            }
            _ => {}
        }
    }

    let mut merged = Vec::new();
    for activity in base {
        let id = activity.id.clone().unwrap_or_default();
        let planned = match decisions.iter().position(|(existing, _)| *existing == id) {
            Some(index) => {
                let (_, decision) = decisions.remove(index);
                normalize(decision.edited.unwrap_or(activity), &id, decision.status)
            }
            None => normalize(activity, &id, ActivityStatus::Pending),
        };
        merged.push(planned);
    }
    // Edited activities that were never part of the suggestion.
    for (id, decision) in decisions {
        if let Some(edited) = decision.edited {
            merged.push(normalize(edited, &id, decision.status));
        }
    }

    if merged
        .iter()
        .any(|planned| planned.status == ActivityStatus::Accepted)
    {
        merged.retain(|planned| planned.status == ActivityStatus::Accepted);
        plan.selection_note = ACCEPTED_NOTE.to_string();
    } else {
        merged.retain(|planned| planned.status != ActivityStatus::Rejected);
        plan.selection_note = FALLBACK_NOTE.to_string();
    }
    plan.activities = merged;
    Some(plan)
}

fn final_assessments(snapshot: &ExportSnapshot) -> Option<AssessmentResponse> {
    let response = latest_response(snapshot, &Phase::AssessmentRecommendation)?;
    let items = response.get("assessments")?.as_array()?;
    let text = |key: &str| clean_text(response.get(key).unwrap_or(&Value::Null));

    let assessments = items
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| AssessmentItem::deserialize(item).ok())
        .map(|mut item| {
            item.title = strip_markdown(&item.title);
            item.assessment_type = strip_markdown(&item.assessment_type);
            item.method = strip_markdown(&item.method);
            item.description = strip_markdown(&item.description);
            item.timing = strip_markdown(&item.timing);
            item.weight = strip_markdown(&item.weight);
            item.feedback_strategy = strip_markdown(&item.feedback_strategy);
            item.objective_alignment = clean_list(&item.objective_alignment);
            item.rubric_criteria = clean_list(&item.rubric_criteria);
            item
        })
        .collect();

    Some(AssessmentResponse {
        assessments,
        assessment_strategy_rationale: text("assessment_strategy_rationale"),
        formative_summative_balance: text("formative_summative_balance"),
    })
}
