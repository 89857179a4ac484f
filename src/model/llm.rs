//! AI invocation envelopes and parsed response views.
//!
//! The API returns AI output as an opaque `data` object whose shape depends
//! on which generation endpoint was called. [`AiPayload::from_value`] casts
//! it into the expected view type. A payload that the server flagged with
//! `parse_error` or that does not fit the view becomes
//! [`AiPayload::Malformed`]: a visible, recoverable condition rather than an
//! error, since the remote call itself succeeded.
//!
//! Every view field is defaulted and list fields accept a bare string, so
//! partially-formed model output still renders.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::text::strip_code_fences;

/// Uniform response of the three generation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmEnvelope {
    pub success: bool,
    pub step_id: i64,
    pub recommendation_id: i64,
    #[serde(default)]
    pub data: Value,
}

/// Result of the `GET /llm/status` probe. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmStatus {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    pub configured: bool,
    #[serde(default)]
    pub message: String,
}

/// A parsed AI response, or the raw text when it could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AiPayload<T> {
    Parsed(T),
    Malformed { raw_response: String },
}

impl<T: DeserializeOwned> AiPayload<T> {
    /// Cast an envelope's `data` into the view type `T`.
    pub fn from_value(data: &Value) -> Self {
        if data.get("parse_error").and_then(Value::as_bool) == Some(true) {
            let raw = data
                .get("raw_response")
                .map(value_to_text)
                .unwrap_or_default();
            // The server only strips fences at the very start and end; retry
            // once on the trimmed text before giving up.
            if let Ok(parsed) = serde_json::from_str::<T>(&strip_code_fences(&raw)) {
                return Self::Parsed(parsed);
            }
            return Self::Malformed { raw_response: raw };
        }

        if let Value::String(text) = data {
            return match serde_json::from_str::<T>(&strip_code_fences(text)) {
                Ok(parsed) => Self::Parsed(parsed),
                Err(_) => Self::Malformed {
                    raw_response: text.clone(),
                },
            };
        }

        match T::deserialize(data) {
            Ok(parsed) => Self::Parsed(parsed),
            Err(e) => {
                tracing::debug!("AI payload did not match expected shape: {}", e);
                Self::Malformed {
                    raw_response: data.to_string(),
                }
            }
        }
    }
}

impl<T> AiPayload<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Malformed { .. } => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Analysis of a set of learning objectives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveAnalysisResponse {
    #[serde(deserialize_with = "lenient_string")]
    pub overall_assessment: String,
    #[serde(deserialize_with = "objects_only")]
    pub bloom_analysis: Vec<BloomAnalysis>,
    #[serde(deserialize_with = "lenient_string")]
    pub alignment_notes: String,
    #[serde(deserialize_with = "string_or_list")]
    pub missing_coverage: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub improved_objectives: Vec<String>,
}

/// Bloom-taxonomy analysis of a single objective.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomAnalysis {
    #[serde(deserialize_with = "lenient_string")]
    pub objective: String,
    #[serde(deserialize_with = "lenient_string")]
    pub current_level: String,
    #[serde(deserialize_with = "lenient_string")]
    pub domain: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_measurable: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub suggestion: String,
}

/// Response of the activity-suggestion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySuggestionResponse {
    #[serde(deserialize_with = "indexed_activities")]
    pub activities: Vec<ActivityItem>,
    #[serde(deserialize_with = "lenient_string")]
    pub sequence_rationale: String,
    #[serde(deserialize_with = "lenient_string")]
    pub total_estimated_time: String,
}

impl ActivitySuggestionResponse {
    /// Give every activity without an id the positional id `activity-{index}`.
    pub fn with_ids(mut self) -> Self {
        for (index, activity) in self.activities.iter_mut().enumerate() {
            if activity.id.is_none() {
                activity.id = Some(activity_id(index));
            }
        }
        self
    }
}

/// Positional identifier used to correlate user actions with activities.
pub fn activity_id(index: usize) -> String {
    format!("activity-{}", index)
}

/// A suggested learning activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityItem {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_id"
    )]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub activity_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "string_or_list")]
    pub objective_alignment: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(deserialize_with = "string_or_list")]
    pub materials_needed: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub instructions: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub assessment_criteria: String,
    #[serde(deserialize_with = "string_map")]
    pub adaptations: BTreeMap<String, String>,
}

/// Response of the assessment-recommendation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentResponse {
    #[serde(deserialize_with = "objects_only")]
    pub assessments: Vec<AssessmentItem>,
    #[serde(deserialize_with = "lenient_string")]
    pub assessment_strategy_rationale: String,
    #[serde(deserialize_with = "lenient_string")]
    pub formative_summative_balance: String,
}

/// A recommended assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentItem {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub assessment_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub method: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "string_or_list")]
    pub objective_alignment: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub timing: String,
    #[serde(deserialize_with = "lenient_string")]
    pub weight: String,
    #[serde(deserialize_with = "string_or_list")]
    pub rubric_criteria: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub feedback_strategy: String,
}

/// Render any JSON value as display text. Strings are returned unquoted.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_text(&Value::deserialize(deserializer)?))
}

fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        other => vec![value_to_text(&other)],
    })
}

/// Loose truthiness: null is false, and so are `"no"`, `"false"` and `"0"`.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let id = value_to_text(&Value::deserialize(deserializer)?);
    Ok((!id.trim().is_empty()).then(|| id.trim().to_string()))
}

/// A list keeping only the object entries that parse. Anything else is skipped.
fn objects_only<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        item @ Value::Object(_) => serde_json::from_value(item).into_iter().collect(),
        _ => Vec::new(),
    })
}

/// Object entries become activities. Positional ids follow the original
/// list, so skipped entries do not shift the ids of later ones.
fn indexed_activities<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ActivityItem>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        item @ Value::Object(_) => vec![item],
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter(|(_, item)| item.is_object())
        .filter_map(|(index, item)| {
            let mut activity: ActivityItem = serde_json::from_value(item).ok()?;
            if activity.id.is_none() {
                activity.id = Some(activity_id(index));
            }
            Some(activity)
        })
        .collect())
}

fn string_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), value_to_text(value)))
            .collect(),
        Value::Null => BTreeMap::new(),
        other => BTreeMap::from([("notes".to_string(), value_to_text(&other))]),
    })
}
