//! Sessions and the course-context draft form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{IdDssError, Result};

/// One instructional-design engagement for a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Server-assigned identifier.
    pub id: i64,
    pub course_title: String,
    /// Education level, e.g. "undergraduate", "graduate", "professional".
    pub level: String,
    /// Delivery modality, e.g. "online", "in-person", "hybrid".
    pub modality: String,
    #[serde(default)]
    pub constraints: Option<String>,
    #[serde(default)]
    pub learning_objectives: Option<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /sessions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCreate {
    pub course_title: String,
    pub level: String,
    pub modality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<String>,
}

/// Partial update for `PATCH /sessions/{id}`.
///
/// Only fields that are `Some` are sent; the server leaves the rest alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<String>,
}

impl SessionUpdate {
    /// Patch that only touches the learning objectives.
    pub fn learning_objectives(text: impl Into<String>) -> Self {
        Self {
            learning_objectives: Some(text.into()),
            ..Default::default()
        }
    }

    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.course_title.is_none()
            && self.level.is_none()
            && self.modality.is_none()
            && self.constraints.is_none()
            && self.learning_objectives.is_none()
    }
}

/// Mutable draft of the course context, edited before and while it is persisted.
///
/// Empty strings mean "unset" for the optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseContextForm {
    pub course_title: String,
    pub level: String,
    pub modality: String,
    pub constraints: String,
    pub learning_objectives: String,
}

impl CourseContextForm {
    /// Populate a draft from a persisted session.
    pub fn from_session(session: &Session) -> Self {
        Self {
            course_title: session.course_title.clone(),
            level: session.level.clone(),
            modality: session.modality.clone(),
            constraints: session.constraints.clone().unwrap_or_default(),
            learning_objectives: session.learning_objectives.clone().unwrap_or_default(),
        }
    }

    /// Check that the required fields are filled in.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("course title", &self.course_title),
            ("level", &self.level),
            ("modality", &self.modality),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(IdDssError::InvalidForm {
                message: format!("{} required", missing.join(", ")),
            })
        }
    }

    /// Build the create request. Blank optional fields are omitted.
    pub fn to_create(&self) -> SessionCreate {
        SessionCreate {
            course_title: self.course_title.trim().to_string(),
            level: self.level.trim().to_string(),
            modality: self.modality.trim().to_string(),
            constraints: non_blank(&self.constraints),
            learning_objectives: non_blank(&self.learning_objectives),
        }
    }

    /// Build a patch containing every field that differs from `session`.
    pub fn diff_against(&self, session: &Session) -> SessionUpdate {
        let changed = |draft: &str, current: &str| {
            (draft.trim() != current.trim()).then(|| draft.trim().to_string())
        };
        SessionUpdate {
            course_title: changed(&self.course_title, &session.course_title),
            level: changed(&self.level, &session.level),
            modality: changed(&self.modality, &session.modality),
            constraints: changed(
                &self.constraints,
                session.constraints.as_deref().unwrap_or_default(),
            ),
            learning_objectives: changed(
                &self.learning_objectives,
                session.learning_objectives.as_deref().unwrap_or_default(),
            ),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
