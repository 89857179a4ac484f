//! Blocking REST client for the design-support API.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{IdDssError, Result};
use crate::model::{
    AIRecommendation, DesignStep, DesignStepCreate, ExportSnapshot, LlmEnvelope, LlmStatus,
    Session, SessionCreate, SessionUpdate, UserAction, UserActionCreate,
};

use super::ExportFormat;

/// Operations the workflow needs from the remote service.
///
/// Every method issues exactly one request and returns the server's
/// entity. Errors are returned as-is; there is no retry.
pub trait SessionApi {
    fn create_session(&self, session: &SessionCreate) -> Result<Session>;
    fn update_session(&self, session_id: i64, patch: &SessionUpdate) -> Result<Session>;
    fn get_session(&self, session_id: i64) -> Result<Session>;
    fn list_sessions(&self) -> Result<Vec<Session>>;

    fn create_step(&self, step: &DesignStepCreate) -> Result<DesignStep>;
    fn list_steps(&self, session_id: Option<i64>) -> Result<Vec<DesignStep>>;
    fn get_step(&self, step_id: i64) -> Result<DesignStep>;

    fn list_recommendations(&self, step_id: Option<i64>) -> Result<Vec<AIRecommendation>>;
    fn get_recommendation(&self, recommendation_id: i64) -> Result<AIRecommendation>;

    fn create_action(&self, action: &UserActionCreate) -> Result<UserAction>;
    fn list_actions(&self, step_id: Option<i64>) -> Result<Vec<UserAction>>;

    /// Advisory probe of whether the AI backend is configured.
    fn llm_status(&self) -> Result<LlmStatus>;
    fn analyze_objectives(&self, session_id: i64, objectives: &str) -> Result<LlmEnvelope>;
    fn suggest_activities(&self, session_id: i64, objectives: &str) -> Result<LlmEnvelope>;
    fn recommend_assessments(
        &self,
        session_id: i64,
        objectives: &str,
        activities: &str,
    ) -> Result<LlmEnvelope>;

    fn export_session(&self, session_id: i64) -> Result<ExportSnapshot>;
    /// Rendered document bytes. Not parsed.
    fn download_export(&self, session_id: i64, format: ExportFormat) -> Result<Vec<u8>>;
}

#[derive(Serialize)]
struct ObjectivesRequest<'a> {
    session_id: i64,
    objectives: &'a str,
}

#[derive(Serialize)]
struct AssessmentRequest<'a> {
    session_id: i64,
    objectives: &'a str,
    activities: &'a str,
}

/// HTTP implementation of [`SessionApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` for an unusable config and
    /// `Transport` if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, method: Method, path: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!("{} {}", method, path);
        let response = request.send().map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            IdDssError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let detail = error_detail(&body);
        tracing::warn!("{} {} returned {}: {}", method, path, status.as_u16(), detail);
        Err(IdDssError::Http {
            status: status.as_u16(),
            detail,
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, self.client.get(self.url(path)))?;
        decode(response, path)
    }

    fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.request(method.clone(), self.url(path)).json(body);
        let response = self.send(method, path, request)?;
        decode(response, path)
    }
}

impl SessionApi for ApiClient {
    fn create_session(&self, session: &SessionCreate) -> Result<Session> {
        self.send_json(Method::POST, "/sessions/", session)
    }

    fn update_session(&self, session_id: i64, patch: &SessionUpdate) -> Result<Session> {
        self.send_json(Method::PATCH, &format!("/sessions/{}", session_id), patch)
    }

    fn get_session(&self, session_id: i64) -> Result<Session> {
        self.get(&format!("/sessions/{}", session_id))
    }

    fn list_sessions(&self) -> Result<Vec<Session>> {
        self.get("/sessions/")
    }

    fn create_step(&self, step: &DesignStepCreate) -> Result<DesignStep> {
        self.send_json(Method::POST, "/steps/", step)
    }

    fn list_steps(&self, session_id: Option<i64>) -> Result<Vec<DesignStep>> {
        self.get(&with_filter("/steps/", "session_id", session_id))
    }

    fn get_step(&self, step_id: i64) -> Result<DesignStep> {
        self.get(&format!("/steps/{}", step_id))
    }

    fn list_recommendations(&self, step_id: Option<i64>) -> Result<Vec<AIRecommendation>> {
        self.get(&with_filter("/recommendations/", "step_id", step_id))
    }

    fn get_recommendation(&self, recommendation_id: i64) -> Result<AIRecommendation> {
        self.get(&format!("/recommendations/{}", recommendation_id))
    }

    fn create_action(&self, action: &UserActionCreate) -> Result<UserAction> {
        self.send_json(Method::POST, "/actions/", action)
    }

    fn list_actions(&self, step_id: Option<i64>) -> Result<Vec<UserAction>> {
        self.get(&with_filter("/actions/", "step_id", step_id))
    }

    fn llm_status(&self) -> Result<LlmStatus> {
        self.get("/llm/status")
    }

    fn analyze_objectives(&self, session_id: i64, objectives: &str) -> Result<LlmEnvelope> {
        self.send_json(
            Method::POST,
            "/llm/analyze-objectives",
            &ObjectivesRequest {
                session_id,
                objectives,
            },
        )
    }

    fn suggest_activities(&self, session_id: i64, objectives: &str) -> Result<LlmEnvelope> {
        self.send_json(
            Method::POST,
            "/llm/suggest-activities",
            &ObjectivesRequest {
                session_id,
                objectives,
            },
        )
    }

    fn recommend_assessments(
        &self,
        session_id: i64,
        objectives: &str,
        activities: &str,
    ) -> Result<LlmEnvelope> {
        self.send_json(
            Method::POST,
            "/llm/recommend-assessments",
            &AssessmentRequest {
                session_id,
                objectives,
                activities,
            },
        )
    }

    fn export_session(&self, session_id: i64) -> Result<ExportSnapshot> {
        self.get(&format!("/export/{}", session_id))
    }

    fn download_export(&self, session_id: i64, format: ExportFormat) -> Result<Vec<u8>> {
        let path = format!("/export/{}/{}", session_id, format.path_segment());
        let response = self.send(Method::GET, &path, self.client.get(self.url(&path)))?;
        Ok(response.bytes()?.to_vec())
    }
}

fn with_filter(path: &str, key: &str, value: Option<i64>) -> String {
    match value {
        Some(value) => format!("{}?{}={}", path, key, value),
        None => path.to_string(),
    }
}

fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
    let body = response.text()?;
    serde_json::from_str(&body).map_err(|e| IdDssError::Decode {
        context: format!("response from {}", path),
        message: e.to_string(),
    })
}

/// Pull the human-readable message out of an error body.
///
/// The API answers errors with `{"detail": ...}`. Validation failures carry
/// a list of `{msg}` objects instead of a string.
fn error_detail(body: &str) -> String {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    match map.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item.get("msg") {
                Some(Value::String(msg)) => msg.clone(),
                _ => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}
