//! AI recommendations attached to design steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Phase;

/// One AI-generated response attached to a design step. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIRecommendation {
    pub id: i64,
    pub step_id: i64,
    pub phase: Phase,
    /// JSON (or plain text) exactly as the server stored it.
    pub raw_response: String,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl AIRecommendation {
    /// The stored response as JSON, or a JSON string when it is not JSON.
    pub fn parsed_response(&self) -> Value {
        serde_json::from_str(&self.raw_response)
            .unwrap_or_else(|_| Value::String(self.raw_response.clone()))
    }
}
