//! Client configuration.
//!
//! - Settings and defaults in [`schema`]
//! - File discovery, layering and environment overrides in [`loader`]
//!
//! # Configuration Sources
//!
//! Later sources override earlier ones:
//! 1. Built-in defaults
//! 2. User config (`~/.id-dss/config.yml`)
//! 3. Project config (`.id-dss.yml` in the working directory)
//! 4. Environment (`ID_DSS_API_BASE`, `ID_DSS_TIMEOUT_SECS`, `ID_DSS_EXPORT_DIR`)
//! 5. Command-line flags
//!
//! # Example
//!
//! ```
//! use id_dss::config::{load_client_config, ConfigPaths};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".id-dss.yml"), "timeout_secs: 5").unwrap();
//!
//! let paths = ConfigPaths {
//!     user_global: None,
//!     project: Some(temp.path().join(".id-dss.yml")),
//! };
//! let config = load_client_config(&paths, |_| None).unwrap();
//! assert_eq!(config.timeout_secs, 5);
//! assert_eq!(config.api_base_url, "http://localhost:8000/api/v1");
//! ```

pub mod loader;
pub mod schema;

pub use loader::{apply_env, load_client_config, load_config_file, ConfigPaths};
pub use schema::{ClientConfig, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
