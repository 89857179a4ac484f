//! Typed entities exchanged with the design-session API.
//!
//! The server is the system of record for every type here; the client only
//! ever holds copies. Request types (`*Create`, [`SessionUpdate`]) carry the
//! subset of fields the API accepts.
//!
//! - [`session`] - Sessions and the course-context draft form
//! - [`step`] - Design steps and workflow phases
//! - [`recommendation`] - AI recommendations attached to steps
//! - [`action`] - User decisions on recommendations
//! - [`llm`] - AI invocation envelopes and parsed response views
//! - [`export`] - Structured export snapshot

pub mod action;
pub mod export;
pub mod llm;
pub mod recommendation;
pub mod session;
pub mod step;
pub mod timestamp;

pub use action::{ActionType, UserAction, UserActionCreate};
pub use export::{
    ExportAction, ExportRecommendation, ExportSession, ExportSnapshot, ExportStep, ExportSummary,
};
pub use llm::{
    activity_id, ActivityItem, ActivitySuggestionResponse, AiPayload, AssessmentItem,
    AssessmentResponse, BloomAnalysis, LlmEnvelope, LlmStatus, ObjectiveAnalysisResponse,
};
pub use recommendation::AIRecommendation;
pub use session::{CourseContextForm, Session, SessionCreate, SessionUpdate};
pub use step::{DesignStep, DesignStepCreate, Phase};
