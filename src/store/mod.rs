//! Client-side session state.
//!
//! [`SessionStore`] is the single source of truth for the in-progress design
//! session. It is an explicit value owned by whoever drives the workflow and
//! passed to the code that needs it; there is no global instance. Views learn
//! about changes by subscribing a [`StoreObserver`].
//!
//! - [`state`] - The store, its state snapshot and derived lookups
//! - [`observer`] - Change events and subscriptions
//! - [`flags`] - Independent busy flags per operation category

pub mod flags;
pub mod observer;
pub mod state;

pub use flags::BusyFlags;
pub use observer::{StoreEvent, StoreObserver, SubscriptionId};
pub use state::{SessionState, SessionStore};
