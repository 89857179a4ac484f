//! id-dss - Guided instructional design from the terminal.
//!
//! id-dss is a client for an instructional-design decision-support
//! service. It walks a course designer through describing a course,
//! analyzing learning objectives, choosing activities and assessments,
//! and exporting the resulting design plan.
//!
//! # Modules
//!
//! - [`api`] - HTTP client for the design-support REST API
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Client configuration files and environment overrides
//! - [`design`] - Building and rendering the final design plan
//! - [`error`] - Error types and result aliases
//! - [`model`] - Wire types for sessions, steps, recommendations and actions
//! - [`reconcile`] - Dirty-field tracking and stale-response guarding
//! - [`store`] - Observable state of the current design session
//! - [`text`] - Markdown stripping and objective list handling
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`workflow`] - The design workflow tying store, API and reconciliation together
//!
//! # Example
//!
//! ```
//! use id_dss::text::{normalize_objectives, strip_markdown};
//!
//! assert_eq!(strip_markdown("**Apply** regression"), "Apply regression");
//! assert_eq!(
//!     normalize_objectives("- Explain overfitting\n- Apply regression"),
//!     "1. Explain overfitting\n2. Apply regression"
//! );
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod design;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod text;
pub mod ui;
pub mod workflow;

pub use error::{IdDssError, Result};
