//! Remote session client.
//!
//! [`ApiClient`] issues exactly one HTTP request per call against the REST
//! service and returns typed entities. Failures propagate to the caller;
//! nothing is retried.
//!
//! The workflow talks to the service through the [`SessionApi`] trait so it
//! can be driven by a scripted fake in tests.

pub mod client;
pub mod download;

pub use client::{ApiClient, SessionApi};
pub use download::{export_filename, save_export, ExportFormat};
