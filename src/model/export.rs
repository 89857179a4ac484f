//! Structured export snapshot returned by `GET /export/{session_id}`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ActionType, Phase};

/// Session plus its full step history and aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub session: ExportSession,
    #[serde(default)]
    pub design_steps: Vec<ExportStep>,
    #[serde(default)]
    pub summary: ExportSummary,
    #[serde(with = "super::timestamp")]
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSession {
    pub id: i64,
    pub course_title: String,
    pub level: String,
    pub modality: String,
    #[serde(default)]
    pub constraints: Option<String>,
    #[serde(default)]
    pub learning_objectives: Option<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportStep {
    pub id: i64,
    pub phase: Phase,
    #[serde(default)]
    pub user_input: Option<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub recommendations: Vec<ExportRecommendation>,
    #[serde(default)]
    pub user_actions: Vec<ExportAction>,
}

/// A recommendation with its response already decoded by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecommendation {
    pub id: i64,
    pub phase: Phase,
    /// Decoded JSON, or a plain string when the stored response was not JSON.
    #[serde(default)]
    pub response: Value,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportAction {
    pub id: i64,
    #[serde(default)]
    pub recommendation_id: Option<i64>,
    pub action_type: ActionType,
    #[serde(default)]
    pub edited_content: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    #[serde(default)]
    pub total_steps: u64,
    #[serde(default)]
    pub total_recommendations: u64,
    #[serde(default)]
    pub total_actions: u64,
    #[serde(default)]
    pub actions_by_type: BTreeMap<String, u64>,
}

impl ExportSnapshot {
    /// Most recent step of `phase` by creation time.
    pub fn latest_step(&self, phase: &Phase) -> Option<&ExportStep> {
        self.design_steps
            .iter()
            .filter(|step| &step.phase == phase)
            .max_by_key(|step| step.created_at)
    }
}

impl ExportStep {
    /// Most recent recommendation on this step by creation time.
    pub fn latest_recommendation(&self) -> Option<&ExportRecommendation> {
        self.recommendations.iter().max_by_key(|rec| rec.created_at)
    }
}
