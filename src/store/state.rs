//! The session store and its state snapshot.

use std::fmt;

use crate::model::{
    AIRecommendation, ActivityItem, ActivitySuggestionResponse, AiPayload, AssessmentResponse,
    CourseContextForm, DesignStep, ObjectiveAnalysisResponse, Phase, Session, UserAction,
};

use super::{BusyFlags, StoreEvent, StoreObserver, SubscriptionId};

/// Everything the store holds. `Default` is the documented initial state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub course_context: CourseContextForm,
    pub design_steps: Vec<DesignStep>,
    pub recommendations: Vec<AIRecommendation>,
    pub user_actions: Vec<UserAction>,
    pub objective_analysis: Option<AiPayload<ObjectiveAnalysisResponse>>,
    pub activity_suggestions: Vec<ActivityItem>,
    pub assessment_plan: Option<AiPayload<AssessmentResponse>>,
    pub flags: BusyFlags,
}

/// Observable container for the current design session.
///
/// Mutations never fail and carry no I/O. Each one updates the state and
/// then notifies every subscriber with a single [`StoreEvent`].
#[derive(Default)]
pub struct SessionStore {
    state: SessionState,
    observers: Vec<(SubscriptionId, Box<dyn StoreObserver>)>,
    next_subscription: u64,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the whole state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    // --- subscriptions ---

    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, observer));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&self, event: StoreEvent) {
        for (_, observer) in &self.observers {
            observer.on_change(&event);
        }
    }

    // --- mutations ---

    /// Make `session` current. History is left untouched.
    pub fn set_session(&mut self, session: Session) {
        tracing::debug!("Active session is now {}", session.id);
        self.state.session = Some(session);
        self.notify(StoreEvent::SessionChanged);
    }

    /// Replace the draft form with a copy of `form`.
    pub fn set_course_context(&mut self, form: &CourseContextForm) {
        self.state.course_context = form.clone();
        self.notify(StoreEvent::CourseContextChanged);
    }

    /// Change the objectives field only.
    pub fn update_learning_objectives(&mut self, text: impl Into<String>) {
        self.state.course_context.learning_objectives = text.into();
        self.notify(StoreEvent::CourseContextChanged);
    }

    pub fn add_design_step(&mut self, step: DesignStep) {
        let id = step.id;
        self.state.design_steps.push(step);
        self.notify(StoreEvent::StepAdded(id));
    }

    pub fn add_recommendation(&mut self, recommendation: AIRecommendation) {
        let id = recommendation.id;
        self.state.recommendations.push(recommendation);
        self.notify(StoreEvent::RecommendationAdded(id));
    }

    pub fn add_user_action(&mut self, action: UserAction) {
        let id = action.id;
        self.state.user_actions.push(action);
        self.notify(StoreEvent::ActionAdded(id));
    }

    pub fn set_objective_analysis(
        &mut self,
        analysis: Option<AiPayload<ObjectiveAnalysisResponse>>,
    ) {
        self.state.objective_analysis = analysis;
        self.notify(StoreEvent::ObjectiveAnalysisChanged);
    }

    pub fn set_activity_suggestions(&mut self, activities: Vec<ActivityItem>) {
        self.state.activity_suggestions = activities;
        self.notify(StoreEvent::ActivitySuggestionsChanged);
    }

    pub fn set_assessment_plan(&mut self, plan: Option<AiPayload<AssessmentResponse>>) {
        self.state.assessment_plan = plan;
        self.notify(StoreEvent::AssessmentPlanChanged);
    }

    pub fn set_loading(&mut self, value: bool) {
        self.set_flags(BusyFlags {
            loading: value,
            ..self.state.flags
        });
    }

    pub fn set_generating(&mut self, value: bool) {
        self.set_flags(BusyFlags {
            generating: value,
            ..self.state.flags
        });
    }

    pub fn set_saving(&mut self, value: bool) {
        self.set_flags(BusyFlags {
            saving: value,
            ..self.state.flags
        });
    }

    pub fn set_exporting(&mut self, value: bool) {
        self.set_flags(BusyFlags {
            exporting: value,
            ..self.state.flags
        });
    }

    fn set_flags(&mut self, flags: BusyFlags) {
        self.state.flags = flags;
        self.notify(StoreEvent::FlagsChanged(flags));
    }

    /// Forget the current session and everything attached to it.
    ///
    /// The whole state is swapped in one assignment so no observer can see
    /// a partially cleared store. Subscriptions survive.
    pub fn reset_session(&mut self) {
        self.state = SessionState::default();
        self.notify(StoreEvent::Reset);
    }

    /// Rebuild the state from server data for an existing session.
    ///
    /// The draft form is filled from the session and the transient views are
    /// derived from the latest recommendation of each generation phase.
    pub fn hydrate(
        &mut self,
        session: Session,
        design_steps: Vec<DesignStep>,
        recommendations: Vec<AIRecommendation>,
        user_actions: Vec<UserAction>,
    ) {
        let mut state = SessionState {
            course_context: CourseContextForm::from_session(&session),
            session: Some(session),
            design_steps,
            recommendations,
            user_actions,
            ..Default::default()
        };

        state.objective_analysis = latest_response(&state, &Phase::ObjectiveAnalysis)
            .map(|rec| AiPayload::from_value(&rec.parsed_response()));
        state.activity_suggestions = latest_response(&state, &Phase::ActivitySuggestion)
            .map(|rec| AiPayload::<ActivitySuggestionResponse>::from_value(&rec.parsed_response()))
            .and_then(|payload| payload.parsed().cloned())
            .map(|response| response.with_ids().activities)
            .unwrap_or_default();
        state.assessment_plan = latest_response(&state, &Phase::AssessmentRecommendation)
            .map(|rec| AiPayload::from_value(&rec.parsed_response()));

        tracing::debug!(
            "Hydrated session with {} steps, {} recommendations, {} actions",
            state.design_steps.len(),
            state.recommendations.len(),
            state.user_actions.len()
        );
        self.state = state;
        self.notify(StoreEvent::Hydrated);
    }

    // --- derived lookups ---

    pub fn has_active_session(&self) -> bool {
        self.state.session.is_some()
    }

    pub fn session_id(&self) -> Option<i64> {
        self.state.session.as_ref().map(|session| session.id)
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    pub fn course_context(&self) -> &CourseContextForm {
        &self.state.course_context
    }

    pub fn flags(&self) -> BusyFlags {
        self.state.flags
    }

    /// First step recorded for `phase`.
    ///
    /// A phase that was re-run has several steps; this returns the earliest.
    /// Use [`latest_step_for_phase`](Self::latest_step_for_phase) for the
    /// one currently on screen.
    pub fn current_step_for_phase(&self, phase: &Phase) -> Option<&DesignStep> {
        self.state.design_steps.iter().find(|step| &step.phase == phase)
    }

    /// Most recently inserted step for `phase`.
    pub fn latest_step_for_phase(&self, phase: &Phase) -> Option<&DesignStep> {
        latest_step(&self.state, phase)
    }

    /// Recommendations of `step_id` in insertion order.
    pub fn recommendations_for_step(&self, step_id: i64) -> Vec<&AIRecommendation> {
        self.state
            .recommendations
            .iter()
            .filter(|rec| rec.step_id == step_id)
            .collect()
    }

    /// Actions recorded against `step_id` in insertion order.
    pub fn actions_for_step(&self, step_id: i64) -> Vec<&UserAction> {
        self.state
            .user_actions
            .iter()
            .filter(|action| action.step_id == step_id)
            .collect()
    }
}

fn latest_step<'a>(state: &'a SessionState, phase: &Phase) -> Option<&'a DesignStep> {
    state.design_steps.iter().rev().find(|step| &step.phase == phase)
}

fn latest_response<'a>(state: &'a SessionState, phase: &Phase) -> Option<&'a AIRecommendation> {
    let step = latest_step(state, phase)?;
    state
        .recommendations
        .iter()
        .rev()
        .find(|rec| rec.step_id == step.id)
}
