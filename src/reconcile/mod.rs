//! Reconciling local edits with the remote system of record.
//!
//! - [`dirty`] - Per-field draft/baseline tracking
//! - [`guard`] - Request ids that reject out-of-order responses

pub mod dirty;
pub mod guard;

pub use dirty::{DirtyField, FieldState, SyncOutcome};
pub use guard::{RequestGuard, RequestKind, RequestTicket};
