//! User decisions on recommendations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of decision a user recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Accept,
    Reject,
    Edit,
    Comment,
    Regenerate,
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Edit => "edit",
            Self::Comment => "comment",
            Self::Regenerate => "regenerate",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "accept" => Self::Accept,
            "reject" => Self::Reject,
            "edit" => Self::Edit,
            "comment" => Self::Comment,
            "regenerate" => Self::Regenerate,
            _ => Self::Other(value),
        }
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        match action {
            ActionType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded user decision. Append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAction {
    pub id: i64,
    pub step_id: i64,
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

/// Request body for `POST /actions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActionCreate {
    pub step_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_id: Option<i64>,
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl UserActionCreate {
    /// An action with no edited content or comment.
    pub fn new(step_id: i64, recommendation_id: Option<i64>, action_type: ActionType) -> Self {
        Self {
            step_id,
            recommendation_id,
            action_type,
            edited_content: None,
            comment: None,
        }
    }

    pub fn with_edited_content(mut self, content: impl Into<String>) -> Self {
        self.edited_content = Some(content.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}
