//! Change notification for the session store.

use super::BusyFlags;

/// Which slice of the store changed.
///
/// Every mutation emits exactly one event, after the state is updated.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SessionChanged,
    CourseContextChanged,
    StepAdded(i64),
    RecommendationAdded(i64),
    ActionAdded(i64),
    ObjectiveAnalysisChanged,
    ActivitySuggestionsChanged,
    AssessmentPlanChanged,
    FlagsChanged(BusyFlags),
    Hydrated,
    Reset,
}

/// Receives store change events.
///
/// Implemented for any `Fn(&StoreEvent)`, so a closure can subscribe directly.
pub trait StoreObserver {
    fn on_change(&self, event: &StoreEvent);
}

impl<F: Fn(&StoreEvent)> StoreObserver for F {
    fn on_change(&self, event: &StoreEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
