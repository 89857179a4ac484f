//! The final instructional design plan.
//!
//! Built from an export snapshot: the latest result of each generation
//! phase, cleaned of markdown, with the user's accept/reject/edit decisions
//! applied to the suggested activities.

pub mod plan;
pub mod render;

pub use plan::{ActivityPlan, ActivityStatus, FinalDesign, PlannedActivity, SessionSummary};
