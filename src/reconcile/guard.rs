//! Monotonic request ids for generation calls.
//!
//! A user can trigger the same generation twice before the first answer
//! arrives. Each request gets a ticket; only the ticket issued last for its
//! kind may write into the displayed view state, so a slow stale response can
//! never overwrite a newer one.

use std::collections::HashMap;

/// Category of request that competes for the same view slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    ObjectiveAnalysis,
    ActivitySuggestion,
    AssessmentRecommendation,
}

impl RequestKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ObjectiveAnalysis => "Objective analysis",
            Self::ActivitySuggestion => "Activity suggestion",
            Self::AssessmentRecommendation => "Assessment recommendation",
        }
    }
}

/// Proof of issue for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    kind: RequestKind,
    id: u64,
}

impl RequestTicket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Issues tickets and decides which responses are still current.
#[derive(Debug, Default)]
pub struct RequestGuard {
    next_id: u64,
    latest: HashMap<RequestKind, u64>,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every earlier ticket of the same kind.
    pub fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        self.next_id += 1;
        self.latest.insert(kind, self.next_id);
        RequestTicket {
            kind,
            id: self.next_id,
        }
    }

    /// Whether `ticket` is the most recent one issued for its kind.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.get(&ticket.kind) == Some(&ticket.id)
    }

    /// Decide whether a response may update view state.
    pub fn accept(&self, ticket: &RequestTicket) -> bool {
        let current = self.is_current(ticket);
        if !current {
            tracing::debug!(
                "Discarding stale {:?} response (ticket {})",
                ticket.kind,
                ticket.id
            );
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_monotonically() {
        let mut guard = RequestGuard::new();
        let a = guard.issue(RequestKind::ObjectiveAnalysis);
        let b = guard.issue(RequestKind::ActivitySuggestion);
        assert!(b.id() > a.id());
    }

    #[test]
    fn newer_ticket_supersedes_older_of_same_kind() {
        let mut guard = RequestGuard::new();
        let first = guard.issue(RequestKind::ObjectiveAnalysis);
        let second = guard.issue(RequestKind::ObjectiveAnalysis);
        assert!(!guard.accept(&first));
        assert!(guard.accept(&second));
    }

    #[test]
    fn kinds_are_independent() {
        let mut guard = RequestGuard::new();
        let analysis = guard.issue(RequestKind::ObjectiveAnalysis);
        let activities = guard.issue(RequestKind::ActivitySuggestion);
        assert!(guard.accept(&analysis));
        assert!(guard.accept(&activities));
    }

    #[test]
    fn accepting_does_not_consume_ticket() {
        let mut guard = RequestGuard::new();
        let ticket = guard.issue(RequestKind::AssessmentRecommendation);
        assert!(guard.accept(&ticket));
        assert!(guard.is_current(&ticket));
    }
}
