//! The guided design workflow.
//!
//! [`Workflow`] ties the pieces together: local edits go into the
//! [`SessionStore`] immediately, persistence goes through [`SessionApi`],
//! the learning objectives are reconciled with a [`DirtyField`], and
//! generation responses pass through a [`RequestGuard`] before they may
//! replace what is on screen.
//!
//! Generation is split into [`Workflow::begin_generation`] and
//! [`Workflow::complete_generation`] so callers (and tests) control the
//! order in which responses land.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, Utc};

use crate::api::{save_export, ExportFormat, SessionApi};
use crate::design::FinalDesign;
use crate::error::{IdDssError, Result};
use crate::model::{
    AIRecommendation, ActionType, ActivitySuggestionResponse, AiPayload, CourseContextForm,
    DesignStep, LlmEnvelope, Phase, Session, SessionUpdate, UserAction, UserActionCreate,
};
use crate::reconcile::{
    DirtyField, FieldState, RequestGuard, RequestKind, RequestTicket, SyncOutcome,
};
use crate::store::SessionStore;
use crate::text::format_objectives;

/// What happened to a completed generation response.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The parsed response is now the displayed view.
    Applied,
    /// The response is displayed, but only as raw text.
    Malformed { raw_response: String },
    /// A newer request of the same kind was issued, or the session was
    /// closed meanwhile. The view was left alone.
    Stale,
}

/// A generation request in flight, bound to the session it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingGeneration {
    ticket: RequestTicket,
    session_id: i64,
}

impl PendingGeneration {
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    pub fn session_id(&self) -> i64 {
        self.session_id
    }
}

/// What `export` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// The structured JSON snapshot.
    Snapshot,
    /// The cleaned design plan as plain text.
    Plan,
    /// A server-rendered document.
    Document(ExportFormat),
}

impl ExportTarget {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Snapshot => "json",
            Self::Plan => "txt",
            Self::Document(format) => format.extension(),
        }
    }
}

impl FromStr for ExportTarget {
    type Err = IdDssError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Snapshot),
            "plan" | "txt" | "text" => Ok(Self::Plan),
            other => other.parse().map(Self::Document),
        }
    }
}

/// Phase recorded for a generation request.
pub fn phase_for(kind: RequestKind) -> Phase {
    match kind {
        RequestKind::ObjectiveAnalysis => Phase::ObjectiveAnalysis,
        RequestKind::ActivitySuggestion => Phase::ActivitySuggestion,
        RequestKind::AssessmentRecommendation => Phase::AssessmentRecommendation,
    }
}

/// Step input the server records for an assessment request.
pub fn assessment_input(objectives: &str, activities: &str) -> String {
    format!("Objectives:\n{}\n\nActivities:\n{}", objectives, activities)
}

/// Drives one design session against the remote service.
pub struct Workflow<A: SessionApi> {
    api: A,
    store: SessionStore,
    objectives: DirtyField<String>,
    guard: RequestGuard,
    last_error: Option<String>,
}

impl<A: SessionApi> Workflow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            store: SessionStore::new(),
            objectives: DirtyField::default(),
            guard: RequestGuard::new(),
            last_error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Mutable store access, e.g. for subscribing observers.
    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    pub fn objectives(&self) -> &DirtyField<String> {
        &self.objectives
    }

    /// Message for the most recent failed operation, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                tracing::debug!("Operation failed: {}", e);
                self.last_error = Some(e.user_message());
            }
        }
        result
    }

    fn require_session(&mut self) -> Result<i64> {
        let id = self.store.session_id().ok_or(IdDssError::NoActiveSession);
        self.track(id)
    }

    // --- session lifecycle ---

    /// Create a session from the course context form and make it current.
    pub fn start_session(&mut self, form: &CourseContextForm) -> Result<Session> {
        let valid = form.validate();
        self.track(valid)?;

        self.store.set_course_context(form);
        self.store.set_loading(true);
        let created = self.api.create_session(&form.to_create());
        self.store.set_loading(false);
        let session = self.track(created)?;

        tracing::info!("Created session {} for '{}'", session.id, session.course_title);
        self.adopt_session(session.clone());
        Ok(session)
    }

    /// Load an existing session and its full history from the server.
    pub fn resume_session(&mut self, session_id: i64) -> Result<Session> {
        self.store.set_loading(true);
        let fetched = self.fetch_history(session_id);
        self.store.set_loading(false);
        let (session, steps, recommendations, actions) = self.track(fetched)?;

        self.store
            .hydrate(session.clone(), steps, recommendations, actions);
        self.objectives = DirtyField::new(session.learning_objectives.clone().unwrap_or_default());
        Ok(session)
    }

    /// Make an existing session current without loading its history.
    pub fn open_session(&mut self, session_id: i64) -> Result<Session> {
        self.store.set_loading(true);
        let fetched = self.api.get_session(session_id);
        self.store.set_loading(false);
        let session = self.track(fetched)?;
        self.adopt_session(session.clone());
        Ok(session)
    }

    #[allow(clippy::type_complexity)]
    fn fetch_history(
        &self,
        session_id: i64,
    ) -> Result<(Session, Vec<DesignStep>, Vec<AIRecommendation>, Vec<UserAction>)> {
        let session = self.api.get_session(session_id)?;
        let steps = self.api.list_steps(Some(session_id))?;
        let mut recommendations = Vec::new();
        let mut actions = Vec::new();
        for step in &steps {
            recommendations.extend(self.api.list_recommendations(Some(step.id))?);
            actions.extend(self.api.list_actions(Some(step.id))?);
        }
        Ok((session, steps, recommendations, actions))
    }

    fn adopt_session(&mut self, session: Session) {
        self.objectives = DirtyField::new(session.learning_objectives.clone().unwrap_or_default());
        self.store
            .set_course_context(&CourseContextForm::from_session(&session));
        self.store.set_session(session);
    }

    /// Forget the current session locally.
    pub fn reset(&mut self) {
        self.store.reset_session();
        self.objectives = DirtyField::default();
        self.last_error = None;
    }

    // --- learning objectives ---

    /// Apply a local edit. Nothing is sent to the server.
    pub fn edit_objectives(&mut self, text: impl Into<String>) -> FieldState {
        let text = text.into();
        self.store.update_learning_objectives(text.clone());
        self.objectives.edit(text)
    }

    /// Replace the draft with AI-suggested objectives as a numbered list.
    pub fn adopt_improved_objectives(&mut self, items: &[String]) -> FieldState {
        self.edit_objectives(format_objectives(items))
    }

    /// Persist the objectives draft if it has unsaved edits.
    ///
    /// Returns `Ok(false)` without any request when the field is clean. On
    /// success the baseline becomes the value the server returned.
    pub fn save_objectives(&mut self) -> Result<bool> {
        if !self.objectives.is_dirty() {
            return Ok(false);
        }
        let session_id = self.require_session()?;

        self.store.set_saving(true);
        let api = &self.api;
        let mut saved = None;
        let result = self.objectives.persist_with(|draft| {
            let session =
                api.update_session(session_id, &SessionUpdate::learning_objectives(draft.clone()))?;
            let server_value = session.learning_objectives.clone().unwrap_or_default();
            saved = Some(session);
            Ok(server_value)
        });
        self.store.set_saving(false);
        self.track(result)?;

        if let Some(session) = saved {
            let objectives = session.learning_objectives.clone().unwrap_or_default();
            self.store.set_session(session);
            self.store.update_learning_objectives(objectives);
        }
        Ok(true)
    }

    /// Drop unsaved edits and return to the persisted value.
    pub fn discard_objectives(&mut self) {
        self.objectives.discard();
        let baseline = self.objectives.baseline().clone();
        self.store.update_learning_objectives(baseline);
    }

    /// Pull the store's persisted objectives into the draft unless the user
    /// is mid-edit.
    pub fn refresh_from_store(&mut self) -> SyncOutcome {
        let canonical = self
            .store
            .session()
            .and_then(|session| session.learning_objectives.clone())
            .unwrap_or_default();
        let outcome = self.objectives.sync_external(canonical);
        if outcome == SyncOutcome::Refreshed {
            let draft = self.objectives.draft().clone();
            self.store.update_learning_objectives(draft);
        }
        outcome
    }

    // --- generation ---

    /// Issue a ticket for a generation request on the current session and
    /// mark generation busy.
    pub fn begin_generation(&mut self, kind: RequestKind) -> Result<PendingGeneration> {
        let session_id = self.require_session()?;
        let ticket = self.guard.issue(kind);
        tracing::debug!(
            "Starting {:?} request {} for session {}",
            kind,
            ticket.id(),
            session_id
        );
        self.store.set_generating(true);
        Ok(PendingGeneration { ticket, session_id })
    }

    /// Record the response to `ticket`.
    ///
    /// A successful response is always appended to the step and
    /// recommendation history. It replaces the displayed view only if
    /// `ticket` is still the latest of its kind.
    pub fn complete_generation(
        &mut self,
        pending: PendingGeneration,
        input: &str,
        response: Result<LlmEnvelope>,
    ) -> Result<GenerationOutcome> {
        let PendingGeneration { ticket, session_id } = pending;
        let current = self.guard.is_current(&ticket);
        if current {
            self.store.set_generating(false);
        }
        if self.store.session_id() != Some(session_id) {
            tracing::debug!(
                "Dropping {:?} response for session {}, which is no longer open",
                ticket.kind(),
                session_id
            );
            return Ok(GenerationOutcome::Stale);
        }
        let envelope = match response {
            Err(e) if !current => {
                tracing::debug!("Superseded {:?} request failed: {}", ticket.kind(), e);
                return Ok(GenerationOutcome::Stale);
            }
            response => self.track(response)?,
        };
        let phase = phase_for(ticket.kind());
        let now = Utc::now();

        self.store.add_design_step(DesignStep {
            id: envelope.step_id,
            session_id,
            phase: phase.clone(),
            user_input: Some(input.to_string()),
            created_at: now,
        });
        self.store.add_recommendation(AIRecommendation {
            id: envelope.recommendation_id,
            step_id: envelope.step_id,
            phase,
            raw_response: serde_json::to_string(&envelope.data)
                .map_err(|e| IdDssError::Other(e.into()))?,
            created_at: now,
        });

        if !self.guard.accept(&ticket) {
            return Ok(GenerationOutcome::Stale);
        }

        let outcome = match ticket.kind() {
            RequestKind::ObjectiveAnalysis => {
                let payload = AiPayload::from_value(&envelope.data);
                let outcome = outcome_of(&payload);
                self.store.set_objective_analysis(Some(payload));
                outcome
            }
            RequestKind::ActivitySuggestion => {
                let payload = AiPayload::<ActivitySuggestionResponse>::from_value(&envelope.data);
                let outcome = outcome_of(&payload);
                let activities = payload
                    .parsed()
                    .cloned()
                    .map(|response| response.with_ids().activities)
                    .unwrap_or_default();
                self.store.set_activity_suggestions(activities);
                outcome
            }
            RequestKind::AssessmentRecommendation => {
                let payload = AiPayload::from_value(&envelope.data);
                let outcome = outcome_of(&payload);
                self.store.set_assessment_plan(Some(payload));
                outcome
            }
        };
        if let GenerationOutcome::Malformed { .. } = outcome {
            tracing::warn!("{} response could not be parsed", ticket.kind().label());
        }
        Ok(outcome)
    }

    /// Analyze `objectives` and show the result.
    pub fn run_objective_analysis(&mut self, objectives: &str) -> Result<GenerationOutcome> {
        let pending = self.begin_generation(RequestKind::ObjectiveAnalysis)?;
        let response = self.api.analyze_objectives(pending.session_id(), objectives);
        self.complete_generation(pending, objectives, response)
    }

    /// Suggest activities for `objectives` and show them.
    pub fn run_activity_suggestion(&mut self, objectives: &str) -> Result<GenerationOutcome> {
        let pending = self.begin_generation(RequestKind::ActivitySuggestion)?;
        let response = self.api.suggest_activities(pending.session_id(), objectives);
        self.complete_generation(pending, objectives, response)
    }

    /// Recommend assessments for `objectives` and the chosen `activities`.
    pub fn run_assessment_recommendation(
        &mut self,
        objectives: &str,
        activities: &str,
    ) -> Result<GenerationOutcome> {
        let pending = self.begin_generation(RequestKind::AssessmentRecommendation)?;
        let response =
            self.api
                .recommend_assessments(pending.session_id(), objectives, activities);
        self.complete_generation(pending, &assessment_input(objectives, activities), response)
    }

    // --- actions and export ---

    /// Record a decision on a recommendation.
    pub fn record_action(
        &mut self,
        step_id: i64,
        recommendation_id: Option<i64>,
        action_type: ActionType,
        edited_content: Option<String>,
        comment: Option<String>,
    ) -> Result<UserAction> {
        let mut request = UserActionCreate::new(step_id, recommendation_id, action_type);
        request.edited_content = edited_content;
        request.comment = comment;

        let created = self.api.create_action(&request);
        let action = self.track(created)?;
        self.store.add_user_action(action.clone());
        Ok(action)
    }

    /// Export the current session into `dir` and return the written file.
    pub fn export(&mut self, target: ExportTarget, dir: &Path) -> Result<PathBuf> {
        let session_id = self.require_session()?;
        self.store.set_exporting(true);
        let result = self.write_export(session_id, target, dir, Utc::now().date_naive());
        self.store.set_exporting(false);
        let path = self.track(result)?;
        tracing::info!("Exported session {} to {}", session_id, path.display());
        Ok(path)
    }

    fn write_export(
        &self,
        session_id: i64,
        target: ExportTarget,
        dir: &Path,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let bytes = match target {
            ExportTarget::Snapshot => {
                let snapshot = self.api.export_session(session_id)?;
                serde_json::to_vec_pretty(&snapshot).map_err(|e| IdDssError::Other(e.into()))?
            }
            ExportTarget::Plan => {
                let snapshot = self.api.export_session(session_id)?;
                FinalDesign::from_snapshot(&snapshot).render_text().into_bytes()
            }
            ExportTarget::Document(format) => self.api.download_export(session_id, format)?,
        };
        save_export(dir, session_id, target.extension(), date, &bytes)
    }
}

fn outcome_of<T>(payload: &AiPayload<T>) -> GenerationOutcome {
    match payload {
        AiPayload::Parsed(_) => GenerationOutcome::Applied,
        AiPayload::Malformed { raw_response } => GenerationOutcome::Malformed {
            raw_response: raw_response.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DesignStepCreate, ExportSnapshot, LlmStatus, SessionCreate};
    use crate::store::StoreEvent;
    use crate::text::normalize_objectives;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Scripted stand-in for the REST service.
    #[derive(Default)]
    struct FakeApi {
        session: RefCell<Option<Session>>,
        fail_updates: Cell<bool>,
        next_id: Cell<i64>,
        updates: RefCell<Vec<SessionUpdate>>,
        steps: Vec<DesignStep>,
        recommendations: Vec<AIRecommendation>,
    }

    impl FakeApi {
        fn next_id(&self) -> i64 {
            self.next_id.set(self.next_id.get() + 1);
            self.next_id.get()
        }

        fn envelope(&self, data: serde_json::Value) -> LlmEnvelope {
            LlmEnvelope {
                success: true,
                step_id: self.next_id(),
                recommendation_id: self.next_id(),
                data,
            }
        }

        fn down() -> IdDssError {
            IdDssError::Http {
                status: 503,
                detail: "Database unavailable".to_string(),
            }
        }
    }

    impl SessionApi for FakeApi {
        fn create_session(&self, session: &SessionCreate) -> Result<Session> {
            let created = Session {
                id: 1,
                course_title: session.course_title.clone(),
                level: session.level.clone(),
                modality: session.modality.clone(),
                constraints: session.constraints.clone(),
                learning_objectives: session.learning_objectives.clone(),
                created_at: Utc::now(),
            };
            *self.session.borrow_mut() = Some(created.clone());
            Ok(created)
        }

        fn update_session(&self, _session_id: i64, patch: &SessionUpdate) -> Result<Session> {
            self.updates.borrow_mut().push(patch.clone());
            if self.fail_updates.get() {
                return Err(Self::down());
            }
            let mut session = self.session.borrow().clone().ok_or(Self::down())?;
            // The server stores objectives as a clean numbered list.
            if let Some(text) = &patch.learning_objectives {
                session.learning_objectives = Some(normalize_objectives(text));
            }
            *self.session.borrow_mut() = Some(session.clone());
            Ok(session)
        }

        fn get_session(&self, session_id: i64) -> Result<Session> {
            self.session.borrow().clone().ok_or(IdDssError::Http {
                status: 404,
                detail: format!("Session with id {} not found", session_id),
            })
        }

        fn list_sessions(&self) -> Result<Vec<Session>> {
            Ok(self.session.borrow().iter().cloned().collect())
        }

        fn create_step(&self, _step: &DesignStepCreate) -> Result<DesignStep> {
            Err(Self::down())
        }

        fn list_steps(&self, _session_id: Option<i64>) -> Result<Vec<DesignStep>> {
            Ok(self.steps.clone())
        }

        fn get_step(&self, _step_id: i64) -> Result<DesignStep> {
            Err(Self::down())
        }

        fn list_recommendations(&self, step_id: Option<i64>) -> Result<Vec<AIRecommendation>> {
            Ok(self
                .recommendations
                .iter()
                .filter(|rec| Some(rec.step_id) == step_id)
                .cloned()
                .collect())
        }

        fn get_recommendation(&self, _recommendation_id: i64) -> Result<AIRecommendation> {
            Err(Self::down())
        }

        fn create_action(&self, action: &UserActionCreate) -> Result<UserAction> {
            Ok(UserAction {
                id: self.next_id(),
                step_id: action.step_id,
                recommendation_id: action.recommendation_id,
                action_type: action.action_type.clone(),
                edited_content: action.edited_content.clone(),
                comment: action.comment.clone(),
                created_at: Utc::now(),
            })
        }

        fn list_actions(&self, _step_id: Option<i64>) -> Result<Vec<UserAction>> {
            Ok(Vec::new())
        }

        fn llm_status(&self) -> Result<LlmStatus> {
            Ok(LlmStatus {
                configured: true,
                ..Default::default()
            })
        }

        fn analyze_objectives(&self, _session_id: i64, objectives: &str) -> Result<LlmEnvelope> {
            Ok(self.envelope(json!({
                "overall_assessment": format!("Reviewed: {}", objectives),
                "improved_objectives": ["Explain how gradient descent minimizes loss"]
            })))
        }

        fn suggest_activities(&self, _session_id: i64, _objectives: &str) -> Result<LlmEnvelope> {
            Ok(self.envelope(json!({
                "activities": [{"title": "Gradient walk", "type": "simulation"}],
                "sequence_rationale": "Concrete first"
            })))
        }

        fn recommend_assessments(
            &self,
            _session_id: i64,
            _objectives: &str,
            _activities: &str,
        ) -> Result<LlmEnvelope> {
            Ok(self.envelope(json!({"raw_response": "```json\n{oops", "parse_error": true})))
        }

        fn export_session(&self, _session_id: i64) -> Result<ExportSnapshot> {
            let session = self.session.borrow().clone().ok_or(Self::down())?;
            serde_json::from_value(json!({
                "session": session,
                "design_steps": [],
                "summary": {},
                "exported_at": "2025-03-01T11:00:00"
            }))
            .map_err(|e| IdDssError::Other(e.into()))
        }

        fn download_export(&self, _session_id: i64, _format: ExportFormat) -> Result<Vec<u8>> {
            Ok(b"%PDF-1.4".to_vec())
        }
    }

    fn ml_form() -> CourseContextForm {
        CourseContextForm {
            course_title: "Intro to ML".to_string(),
            level: "undergraduate".to_string(),
            modality: "online".to_string(),
            ..Default::default()
        }
    }

    fn started() -> Workflow<FakeApi> {
        let mut workflow = Workflow::new(FakeApi::default());
        workflow.start_session(&ml_form()).unwrap();
        workflow
    }

    fn envelope(step_id: i64, assessment: &str) -> LlmEnvelope {
        LlmEnvelope {
            success: true,
            step_id,
            recommendation_id: step_id * 10,
            data: json!({"overall_assessment": assessment}),
        }
    }

    fn displayed_assessment(workflow: &Workflow<FakeApi>) -> String {
        workflow
            .store()
            .state()
            .objective_analysis
            .as_ref()
            .and_then(|payload| payload.parsed())
            .map(|analysis| analysis.overall_assessment.clone())
            .unwrap_or_default()
    }

    #[test]
    fn creating_a_session_makes_it_current() {
        let workflow = started();
        let store = workflow.store();
        assert!(store.has_active_session());
        assert_eq!(store.session().unwrap().course_title, "Intro to ML");
        assert_eq!(store.course_context().modality, "online");
        assert!(!store.flags().loading);
    }

    #[test]
    fn invalid_form_is_rejected_without_request() {
        let mut workflow = Workflow::new(FakeApi::default());
        let form = CourseContextForm {
            course_title: "Intro to ML".to_string(),
            ..Default::default()
        };
        let err = workflow.start_session(&form).unwrap_err();
        assert!(matches!(err, IdDssError::InvalidForm { .. }));
        assert!(workflow.api().session.borrow().is_none());
        assert!(workflow.last_error().unwrap().contains("level"));
    }

    #[test]
    fn objective_analysis_appends_step_and_recommendation() {
        let mut workflow = started();
        let outcome = workflow
            .run_objective_analysis("Explain gradient descent")
            .unwrap();
        assert_eq!(outcome, GenerationOutcome::Applied);

        let store = workflow.store();
        let step = store
            .current_step_for_phase(&Phase::ObjectiveAnalysis)
            .unwrap();
        assert_eq!(step.user_input.as_deref(), Some("Explain gradient descent"));
        assert_eq!(store.recommendations_for_step(step.id).len(), 1);
        assert_eq!(
            displayed_assessment(&workflow),
            "Reviewed: Explain gradient descent"
        );
        assert!(!workflow.store().flags().generating);
    }

    #[test]
    fn generation_requires_a_session() {
        let mut workflow = Workflow::new(FakeApi::default());
        let err = workflow.run_activity_suggestion("x").unwrap_err();
        assert!(matches!(err, IdDssError::NoActiveSession));
        assert!(workflow.store().state().design_steps.is_empty());
    }

    #[test]
    fn activity_suggestions_get_positional_ids() {
        let mut workflow = started();
        workflow.run_activity_suggestion("Explain").unwrap();
        let activities = &workflow.store().state().activity_suggestions;
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].id.as_deref(), Some("activity-0"));
        assert_eq!(activities[0].activity_type, "simulation");
    }

    #[test]
    fn malformed_assessment_is_shown_as_raw_text() {
        let mut workflow = started();
        let outcome = workflow
            .run_assessment_recommendation("Explain", "Gradient walk")
            .unwrap();
        assert!(matches!(outcome, GenerationOutcome::Malformed { ref raw_response } if raw_response.contains("oops")));

        let store = workflow.store();
        assert!(store.state().assessment_plan.as_ref().unwrap().is_malformed());
        let step = store
            .latest_step_for_phase(&Phase::AssessmentRecommendation)
            .unwrap();
        assert_eq!(
            step.user_input.as_deref(),
            Some("Objectives:\nExplain\n\nActivities:\nGradient walk")
        );
    }

    #[test]
    fn stale_response_cannot_overwrite_newer_one() {
        let mut workflow = started();
        let first = workflow.begin_generation(RequestKind::ObjectiveAnalysis).unwrap();
        let second = workflow.begin_generation(RequestKind::ObjectiveAnalysis).unwrap();

        // The second request resolves first.
        let newer = workflow
            .complete_generation(second, "v2", Ok(envelope(20, "second")))
            .unwrap();
        let older = workflow
            .complete_generation(first, "v1", Ok(envelope(10, "first")))
            .unwrap();

        assert_eq!(newer, GenerationOutcome::Applied);
        assert_eq!(older, GenerationOutcome::Stale);
        assert_eq!(displayed_assessment(&workflow), "second");
        // Both responses are still part of the history.
        let store = workflow.store();
        assert_eq!(store.state().design_steps.len(), 2);
        assert_eq!(
            store.latest_step_for_phase(&Phase::ObjectiveAnalysis).unwrap().id,
            10
        );
        assert!(!store.flags().generating);
    }

    #[test]
    fn in_order_resolution_shows_latest() {
        let mut workflow = started();
        let first = workflow.begin_generation(RequestKind::ObjectiveAnalysis).unwrap();
        let second = workflow.begin_generation(RequestKind::ObjectiveAnalysis).unwrap();

        workflow
            .complete_generation(first, "v1", Ok(envelope(10, "first")))
            .unwrap();
        assert!(workflow.store().flags().generating);
        workflow
            .complete_generation(second, "v2", Ok(envelope(20, "second")))
            .unwrap();

        assert_eq!(displayed_assessment(&workflow), "second");
        assert!(!workflow.store().flags().generating);
    }

    #[test]
    fn failed_generation_records_error_and_clears_flag() {
        let mut workflow = started();
        let ticket = workflow.begin_generation(RequestKind::ActivitySuggestion).unwrap();
        let err = workflow
            .complete_generation(ticket, "x", Err(FakeApi::down()))
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(workflow.last_error(), Some("Database unavailable"));
        assert!(!workflow.store().flags().generating);
        assert!(workflow.store().state().design_steps.is_empty());
    }

    #[test]
    fn superseded_failure_is_not_reported() {
        let mut workflow = started();
        let first = workflow.begin_generation(RequestKind::ObjectiveAnalysis).unwrap();
        let second = workflow.begin_generation(RequestKind::ObjectiveAnalysis).unwrap();

        workflow
            .complete_generation(second, "v2", Ok(envelope(20, "second")))
            .unwrap();
        let older = workflow
            .complete_generation(first, "v1", Err(FakeApi::down()))
            .unwrap();

        assert_eq!(older, GenerationOutcome::Stale);
        assert_eq!(workflow.last_error(), None);
        assert_eq!(displayed_assessment(&workflow), "second");
        assert_eq!(workflow.store().state().design_steps.len(), 1);
    }

    #[test]
    fn response_after_reset_is_dropped() {
        let mut workflow = started();
        let pending = workflow.begin_generation(RequestKind::ObjectiveAnalysis).unwrap();
        workflow.reset();

        let outcome = workflow
            .complete_generation(pending, "v1", Ok(envelope(10, "first")))
            .unwrap();

        assert_eq!(outcome, GenerationOutcome::Stale);
        assert!(workflow.store().state().design_steps.is_empty());
        assert!(workflow.store().state().recommendations.is_empty());
        assert!(workflow.store().state().objective_analysis.is_none());
    }

    #[test]
    fn generation_needs_an_open_session() {
        let mut workflow = Workflow::new(FakeApi::default());
        let err = workflow
            .begin_generation(RequestKind::ActivitySuggestion)
            .unwrap_err();
        assert!(matches!(err, IdDssError::NoActiveSession));
        assert!(!workflow.store().flags().generating);
    }

    #[test]
    fn save_is_skipped_when_clean() {
        let mut workflow = started();
        assert!(!workflow.save_objectives().unwrap());
        assert!(workflow.api().updates.borrow().is_empty());
    }

    #[test]
    fn successful_save_takes_server_value_as_baseline() {
        let mut workflow = started();
        workflow.edit_objectives("- Explain gradient descent\n- Compare optimizers");
        assert!(workflow.objectives().is_dirty());

        assert!(workflow.save_objectives().unwrap());

        let server_value = "1. Explain gradient descent\n2. Compare optimizers";
        assert_eq!(workflow.objectives().baseline(), server_value);
        assert_eq!(workflow.objectives().draft(), server_value);
        assert!(!workflow.objectives().is_dirty());
        let store = workflow.store();
        assert_eq!(
            store.session().unwrap().learning_objectives.as_deref(),
            Some(server_value)
        );
        assert_eq!(store.course_context().learning_objectives, server_value);
        assert!(!store.flags().saving);
    }

    #[test]
    fn failed_save_keeps_draft_dirty() {
        let mut workflow = started();
        workflow.edit_objectives("Explain gradient descent");
        workflow.api().fail_updates.set(true);

        let err = workflow.save_objectives().unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(workflow.objectives().baseline(), "");
        assert_eq!(workflow.objectives().draft(), "Explain gradient descent");
        assert!(workflow.objectives().is_dirty());
        assert_eq!(workflow.last_error(), Some("Database unavailable"));

        // The user may retry once the service recovers.
        workflow.api().fail_updates.set(false);
        assert!(workflow.save_objectives().unwrap());
        assert!(!workflow.objectives().is_dirty());
        assert!(workflow.last_error().is_none());
    }

    #[test]
    fn refresh_updates_clean_draft_only() {
        let mut workflow = started();
        let mut session = workflow.store().session().unwrap().clone();
        session.learning_objectives = Some("1. From elsewhere".to_string());
        workflow.store_mut().set_session(session.clone());

        assert_eq!(workflow.refresh_from_store(), SyncOutcome::Refreshed);
        assert_eq!(workflow.objectives().draft(), "1. From elsewhere");
        assert_eq!(
            workflow.store().course_context().learning_objectives,
            "1. From elsewhere"
        );

        workflow.edit_objectives("my edit");
        session.learning_objectives = Some("1. Another upstream change".to_string());
        workflow.store_mut().set_session(session);
        assert_eq!(workflow.refresh_from_store(), SyncOutcome::Ignored);
        assert_eq!(workflow.objectives().draft(), "my edit");
    }

    #[test]
    fn discard_restores_baseline() {
        let mut workflow = started();
        workflow.edit_objectives("scratch");
        workflow.discard_objectives();
        assert!(!workflow.objectives().is_dirty());
        assert_eq!(workflow.store().course_context().learning_objectives, "");
    }

    #[test]
    fn adopting_improved_objectives_numbers_them() {
        let mut workflow = started();
        let state = workflow.adopt_improved_objectives(&[
            "Explain gradient descent".to_string(),
            "Tune the learning rate".to_string(),
        ]);
        assert_eq!(state, FieldState::Dirty);
        assert_eq!(
            workflow.objectives().draft(),
            "1. Explain gradient descent\n2. Tune the learning rate"
        );
    }

    #[test]
    fn recorded_actions_land_in_store() {
        let mut workflow = started();
        workflow.run_activity_suggestion("Explain").unwrap();
        let step_id = workflow
            .store()
            .latest_step_for_phase(&Phase::ActivitySuggestion)
            .unwrap()
            .id;

        workflow
            .record_action(step_id, None, ActionType::Accept, None, Some("activity-0".into()))
            .unwrap();

        let actions = workflow.store().actions_for_step(step_id);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].comment.as_deref(), Some("activity-0"));
    }

    #[test]
    fn resume_hydrates_from_server() {
        let api = FakeApi {
            steps: vec![DesignStep {
                id: 4,
                session_id: 1,
                phase: Phase::ActivitySuggestion,
                user_input: Some("Explain".to_string()),
                created_at: Utc::now(),
            }],
            recommendations: vec![AIRecommendation {
                id: 8,
                step_id: 4,
                phase: Phase::ActivitySuggestion,
                raw_response: r#"{"activities":[{"title":"Lab"}]}"#.to_string(),
                created_at: Utc::now(),
            }],
            ..Default::default()
        };
        api.create_session(&ml_form().to_create()).unwrap();

        let mut workflow = Workflow::new(api);
        workflow.resume_session(1).unwrap();

        let store = workflow.store();
        assert_eq!(store.session_id(), Some(1));
        assert_eq!(store.recommendations_for_step(4).len(), 1);
        assert_eq!(store.state().activity_suggestions[0].title, "Lab");
        assert!(!store.flags().loading);
    }

    #[test]
    fn resume_of_unknown_session_fails_visibly() {
        let mut workflow = Workflow::new(FakeApi::default());
        let err = workflow.resume_session(42).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(workflow.last_error(), Some("Session with id 42 not found"));
        assert!(!workflow.store().has_active_session());
    }

    #[test]
    fn open_session_skips_history() {
        let api = FakeApi {
            steps: vec![DesignStep {
                id: 4,
                session_id: 1,
                phase: Phase::ObjectiveAnalysis,
                user_input: None,
                created_at: Utc::now(),
            }],
            ..Default::default()
        };
        api.create_session(&ml_form().to_create()).unwrap();

        let mut workflow = Workflow::new(api);
        workflow.open_session(1).unwrap();

        assert_eq!(workflow.store().session_id(), Some(1));
        assert_eq!(workflow.store().course_context().course_title, "Intro to ML");
        assert!(workflow.store().state().design_steps.is_empty());
    }

    #[test]
    fn export_writes_dated_files() {
        let temp = TempDir::new().unwrap();
        let mut workflow = started();

        let pdf = workflow
            .export(ExportTarget::Document(ExportFormat::Pdf), temp.path())
            .unwrap();
        let json = workflow.export(ExportTarget::Snapshot, temp.path()).unwrap();
        let plan = workflow.export(ExportTarget::Plan, temp.path()).unwrap();

        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(
            pdf.file_name().unwrap().to_string_lossy(),
            format!("id-dss-session-1-{}.pdf", today)
        );
        assert_eq!(std::fs::read(&pdf).unwrap(), b"%PDF-1.4");
        let snapshot: serde_json::Value =
            serde_json::from_slice(&std::fs::read(json).unwrap()).unwrap();
        assert_eq!(snapshot["session"]["course_title"], "Intro to ML");
        assert!(std::fs::read_to_string(plan).unwrap().contains("Intro to ML"));
        assert!(!workflow.store().flags().exporting);
    }

    #[test]
    fn export_target_parses_cli_names() {
        assert_eq!("json".parse::<ExportTarget>().unwrap(), ExportTarget::Snapshot);
        assert_eq!("plan".parse::<ExportTarget>().unwrap(), ExportTarget::Plan);
        assert_eq!(
            "docx".parse::<ExportTarget>().unwrap(),
            ExportTarget::Document(ExportFormat::Docx)
        );
        assert!("xls".parse::<ExportTarget>().is_err());
    }

    #[test]
    fn reset_forgets_everything() {
        let mut workflow = started();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        workflow
            .store_mut()
            .subscribe(Box::new(move |event: &StoreEvent| {
                sink.borrow_mut().push(event.clone())
            }));
        workflow.edit_objectives("draft");

        workflow.reset();

        assert!(!workflow.store().has_active_session());
        assert!(!workflow.objectives().is_dirty());
        assert_eq!(events.borrow().last(), Some(&StoreEvent::Reset));
    }
}
