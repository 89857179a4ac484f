//! Dirty tracking for editable fields.
//!
//! A [`DirtyField`] holds the user's draft next to the baseline, the last
//! value the server confirmed. The dirty predicate is always recomputed from
//! the two values; no flag is cached.
//!
//! | Event | Clean | Dirty |
//! |---|---|---|
//! | local edit | Dirty if value differs | stays Dirty (Clean if reverted) |
//! | persist ok (server value `S`) | baseline = draft = `S` | baseline = draft = `S` |
//! | persist failed | unchanged | unchanged |
//! | upstream change | draft and baseline refreshed | ignored |

use crate::error::Result;

/// Whether a field has unsaved local edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Clean,
    Dirty,
}

/// What [`DirtyField::sync_external`] did with an upstream value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The field was clean and now mirrors the upstream value.
    Refreshed,
    /// The field has local edits; the upstream value was dropped.
    Ignored,
    /// Upstream already matched.
    Unchanged,
}

/// An editable value tracked against its last persisted baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirtyField<T> {
    draft: T,
    baseline: T,
}

impl<T: Clone + PartialEq> DirtyField<T> {
    /// Start clean with `value` as both draft and baseline.
    pub fn new(value: T) -> Self {
        Self {
            draft: value.clone(),
            baseline: value,
        }
    }

    pub fn draft(&self) -> &T {
        &self.draft
    }

    pub fn baseline(&self) -> &T {
        &self.baseline
    }

    pub fn state(&self) -> FieldState {
        if self.draft != self.baseline {
            FieldState::Dirty
        } else {
            FieldState::Clean
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state() == FieldState::Dirty
    }

    /// Apply a local edit.
    pub fn edit(&mut self, value: T) -> FieldState {
        self.draft = value;
        self.state()
    }

    /// Record a successful save. `server_value` is what the server returned,
    /// which becomes authoritative even if it differs from what was sent.
    pub fn commit_success(&mut self, server_value: T) {
        self.baseline = server_value.clone();
        self.draft = server_value;
    }

    /// Record a failed save. The draft and baseline are left untouched so the
    /// edit can be retried.
    pub fn commit_failure(&mut self) -> FieldState {
        self.state()
    }

    /// Offer a value that changed upstream (e.g. the store was re-hydrated).
    pub fn sync_external(&mut self, value: T) -> SyncOutcome {
        if self.is_dirty() {
            return SyncOutcome::Ignored;
        }
        if self.baseline == value {
            return SyncOutcome::Unchanged;
        }
        self.commit_success(value);
        SyncOutcome::Refreshed
    }

    /// Throw away local edits.
    pub fn discard(&mut self) {
        self.draft = self.baseline.clone();
    }

    /// Persist the draft with `save`, which returns the server's value.
    ///
    /// Nothing is sent when the field is clean; `Ok(None)` is returned.
    pub fn persist_with<F>(&mut self, save: F) -> Result<Option<T>>
    where
        F: FnOnce(&T) -> Result<T>,
    {
        if !self.is_dirty() {
            return Ok(None);
        }
        match save(&self.draft) {
            Ok(server_value) => {
                self.commit_success(server_value.clone());
                Ok(Some(server_value))
            }
            Err(e) => {
                self.commit_failure();
                Err(e)
            }
        }
    }
}
