//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`id-dss analyze`, `id-dss export`)
//! - One HTTP client per invocation built from the loaded config
//! - Consistent global flag handling

pub mod action;
pub mod activities;
pub mod analyze;
pub mod assess;
pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod export;
pub mod generation;
pub mod guided;
pub mod session;
pub mod status;
pub mod steps;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

#[cfg(test)]
pub(crate) mod test_support {
    use httpmock::MockServer;
    use serde_json::{json, Value};

    use crate::api::ApiClient;
    use crate::config::ClientConfig;

    pub fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&ClientConfig::default().with_api_base(server.url("/api/v1"))).unwrap()
    }

    pub fn session_json(id: i64, objectives: Option<&str>) -> Value {
        json!({
            "id": id,
            "course_title": "Intro to ML",
            "level": "undergraduate",
            "modality": "online",
            "constraints": null,
            "learning_objectives": objectives,
            "created_at": "2025-03-01T10:00:00.123456"
        })
    }

    pub fn envelope_json(step_id: i64, recommendation_id: i64, data: Value) -> Value {
        json!({
            "success": true,
            "step_id": step_id,
            "recommendation_id": recommendation_id,
            "data": data
        })
    }
}
