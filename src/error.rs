//! Error types for id-dss operations.
//!
//! This module defines [`IdDssError`], the primary error type used throughout
//! the client, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Remote failures are split into transport errors and HTTP status errors
//!   so views can tell "the server said no" apart from "the server is gone"
//! - Malformed AI payloads are NOT errors; they surface as
//!   [`AiPayload::Malformed`](crate::model::AiPayload) since the call succeeded
//! - Use `anyhow::Error` (via `IdDssError::Other`) for unexpected errors
//! - Nothing is retried automatically; every error reaches the user

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for id-dss operations.
#[derive(Debug, Error)]
pub enum IdDssError {
    /// The API answered with a non-success status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response body could not be decoded into the expected type.
    #[error("Failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    /// An operation needs a current session but none is set.
    #[error("No active session. Create or resume a session first.")]
    NoActiveSession,

    /// The course context form is incomplete.
    #[error("Invalid course context: {message}")]
    InvalidForm { message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IdDssError {
    /// Human-readable message suitable for showing next to the failed action.
    ///
    /// HTTP errors show only the server's `detail`, the rest use their
    /// display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { status, detail } if detail.is_empty() => {
                format!("Request failed with status {}", status)
            }
            Self::Http { detail, .. } => detail.clone(),
            Self::Transport(e) if e.is_timeout() => "The server took too long to respond".into(),
            Self::Transport(e) if e.is_connect() => "Could not reach the server".into(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, if this error came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for id-dss operations.
pub type Result<T> = std::result::Result<T, IdDssError>;
