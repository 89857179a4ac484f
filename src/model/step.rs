//! Design steps and workflow phases.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A phase of the guided design workflow.
///
/// Phases the client does not know about are kept verbatim in
/// [`Phase::Other`] so server data is never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    Context,
    ObjectiveAnalysis,
    ActivitySuggestion,
    AssessmentRecommendation,
    Summary,
    Other(String),
}

impl Phase {
    /// Wire name of the phase.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Context => "context",
            Self::ObjectiveAnalysis => "objective-analysis",
            Self::ActivitySuggestion => "activity-suggestion",
            Self::AssessmentRecommendation => "assessment-recommendation",
            Self::Summary => "summary",
            Self::Other(name) => name,
        }
    }

    /// Title used when displaying the phase.
    pub fn label(&self) -> &str {
        match self {
            Self::Context => "Course Context",
            Self::ObjectiveAnalysis => "Objective Analysis",
            Self::ActivitySuggestion => "Activity Suggestions",
            Self::AssessmentRecommendation => "Assessment Recommendations",
            Self::Summary => "Summary",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Phase {
    fn from(value: String) -> Self {
        match value.as_str() {
            "context" => Self::Context,
            "objective-analysis" => Self::ObjectiveAnalysis,
            "activity-suggestion" => Self::ActivitySuggestion,
            "assessment-recommendation" => Self::AssessmentRecommendation,
            "summary" => Self::Summary,
            _ => Self::Other(value),
        }
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Phase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One phase-scoped interaction producing AI input and output.
///
/// Append-only: the client never edits or removes a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignStep {
    pub id: i64,
    pub session_id: i64,
    pub phase: Phase,
    #[serde(default)]
    pub user_input: Option<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /steps/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignStepCreate {
    pub session_id: i64,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_round_trips_wire_names() {
        for name in [
            "context",
            "objective-analysis",
            "activity-suggestion",
            "assessment-recommendation",
            "summary",
        ] {
            let phase: Phase = name.parse().unwrap();
            assert!(!matches!(phase, Phase::Other(_)), "{} should be known", name);
            assert_eq!(phase.as_str(), name);
        }
    }

    #[test]
    fn unknown_phase_is_preserved() {
        let phase: Phase = serde_json::from_str("\"analysis\"").unwrap();
        assert_eq!(phase, Phase::Other("analysis".into()));
        assert_eq!(serde_json::to_string(&phase).unwrap(), "\"analysis\"");
    }

    #[test]
    fn phase_serializes_as_kebab_case() {
        let json = serde_json::to_string(&Phase::ObjectiveAnalysis).unwrap();
        assert_eq!(json, "\"objective-analysis\"");
    }

    #[test]
    fn step_deserializes_from_api_shape() {
        let step: DesignStep = serde_json::from_str(
            r#"{"id":9,"session_id":3,"phase":"objective-analysis","user_input":"Explain gradient descent","created_at":"2025-03-01T10:16:00"}"#,
        )
        .unwrap();
        assert_eq!(step.phase, Phase::ObjectiveAnalysis);
        assert_eq!(step.user_input.as_deref(), Some("Explain gradient descent"));
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::ActivitySuggestion.label(), "Activity Suggestions");
        assert_eq!(Phase::Other("custom".into()).label(), "custom");
    }
}
