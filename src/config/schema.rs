//! Client settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IdDssError, Result};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";

/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for talking to the design-support API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// REST base, including the `/api/v1` prefix.
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Where exports are written. Defaults to the working directory.
    pub export_dir: Option<PathBuf>,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            export_dir: None,
            user_agent: format!("id-dss/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Override the base URL, dropping any trailing slash.
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self.normalize();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Directory exports are saved into.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub(crate) fn normalize(&mut self) {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = trimmed.to_string();
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(IdDssError::ConfigValidationError {
                message: "api_base_url must not be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(IdDssError::ConfigValidationError {
                message: format!("api_base_url must be an http(s) URL, got '{}'", url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(IdDssError::ConfigValidationError {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let config = ClientConfig::default().with_api_base("https://dss.example.edu/api/v1/");
        assert_eq!(config.api_base_url, "https://dss.example.edu/api/v1");
    }

    #[test]
    fn rejects_non_http_base() {
        let config = ClientConfig::default().with_api_base("ftp://example.com");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, IdDssError::ConfigValidationError { .. }));
    }

    #[test]
    fn rejects_empty_base_and_zero_timeout() {
        assert!(ClientConfig::default().with_api_base("  ").validate().is_err());
        let config = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: ClientConfig = serde_yaml::from_str("export_dir: /tmp/plans").unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/plans"));
    }
}
