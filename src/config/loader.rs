//! Configuration file discovery and layering.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::config::schema::ClientConfig;
use crate::error::{IdDssError, Result};

/// Environment variable overriding the API base URL.
pub const ENV_API_BASE: &str = "ID_DSS_API_BASE";
/// Environment variable overriding the request timeout.
pub const ENV_TIMEOUT_SECS: &str = "ID_DSS_TIMEOUT_SECS";
/// Environment variable overriding the export directory.
pub const ENV_EXPORT_DIR: &str = "ID_DSS_EXPORT_DIR";

/// Config files in merge order (later overrides earlier).
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// `~/.id-dss/config.yml`
    pub user_global: Option<PathBuf>,

    /// `.id-dss.yml` in the working directory
    pub project: Option<PathBuf>,
}

impl ConfigPaths {
    /// Find the existing config files for `working_dir`.
    pub fn discover(working_dir: &Path) -> Self {
        Self {
            user_global: dirs::home_dir()
                .map(|home| home.join(".id-dss").join("config.yml"))
                .filter(|path| path.exists()),
            project: Some(working_dir.join(".id-dss.yml")).filter(|path| path.exists()),
        }
    }

    /// Use exactly one file instead of the discovered ones.
    pub fn explicit(path: &Path) -> Self {
        Self {
            user_global: None,
            project: Some(path.to_path_buf()),
        }
    }

    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.user_global.iter().chain(self.project.iter()).collect()
    }
}

/// Load one config file as a raw YAML mapping.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IdDssError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IdDssError::Io(e)
        }
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|e| IdDssError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match value {
        Value::Mapping(_) => Ok(value),
        // An empty file parses as null.
        Value::Null => Ok(Value::Mapping(Default::default())),
        _ => Err(IdDssError::ConfigParseError {
            path: path.to_path_buf(),
            message: "expected a mapping of settings".to_string(),
        }),
    }
}

/// Build the effective config from files, then the environment.
///
/// `env` looks up a variable by name; pass `|key| std::env::var(key).ok()`
/// in production.
pub fn load_client_config<F>(paths: &ConfigPaths, env: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = serde_yaml::Mapping::new();
    for path in paths.all_existing() {
        tracing::debug!("Loading config from {}", path.display());
        if let Value::Mapping(layer) = load_config_file(path)? {
            for (key, value) in layer {
                // Null leaves the lower layer's value in place.
                if !value.is_null() {
                    merged.insert(key, value);
                }
            }
        }
    }

    let source = paths
        .project
        .clone()
        .or_else(|| paths.user_global.clone())
        .unwrap_or_default();
    let mut config: ClientConfig = serde_yaml::from_value(Value::Mapping(merged)).map_err(|e| {
        IdDssError::ConfigParseError {
            path: source,
            message: e.to_string(),
        }
    })?;

    apply_env(&mut config, env)?;
    config.normalize();
    config.validate()?;
    Ok(config)
}

/// Apply `ID_DSS_*` overrides. Empty values are ignored.
pub fn apply_env<F>(config: &mut ClientConfig, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    if let Some(url) = lookup(ENV_API_BASE) {
        config.api_base_url = url;
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        config.timeout_secs =
            raw.trim()
                .parse()
                .map_err(|_| IdDssError::ConfigValidationError {
                    message: format!(
                        "{} must be a whole number of seconds, got '{}'",
                        ENV_TIMEOUT_SECS, raw
                    ),
                })?;
    }
    if let Some(dir) = lookup(ENV_EXPORT_DIR) {
        config.export_dir = Some(PathBuf::from(dir));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn discover_finds_project_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".id-dss.yml"), "timeout_secs: 10").unwrap();

        let paths = ConfigPaths::discover(temp.path());
        assert_eq!(paths.project, Some(temp.path().join(".id-dss.yml")));
    }

    #[test]
    fn discover_skips_missing_project_config() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.project.is_none());
    }

    #[test]
    fn no_files_gives_defaults() {
        let config = load_client_config(&ConfigPaths::default(), no_env).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn project_overrides_user_config() {
        let temp = TempDir::new().unwrap();
        let user = temp.path().join("user.yml");
        let project = temp.path().join("project.yml");
        fs::write(&user, "api_base_url: https://user.example/api/v1\ntimeout_secs: 12").unwrap();
        fs::write(&project, "api_base_url: https://project.example/api/v1/").unwrap();

        let paths = ConfigPaths {
            user_global: Some(user),
            project: Some(project),
        };
        let config = load_client_config(&paths, no_env).unwrap();
        assert_eq!(config.api_base_url, "https://project.example/api/v1");
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn environment_overrides_files() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join(".id-dss.yml");
        fs::write(&project, "timeout_secs: 12").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_TIMEOUT_SECS, "45"),
            (ENV_EXPORT_DIR, "/srv/exports"),
            (ENV_API_BASE, ""),
        ]);

        let config = load_client_config(&ConfigPaths::explicit(&project), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.export_dir, Some(PathBuf::from("/srv/exports")));
        assert_eq!(config.api_base_url, crate::config::DEFAULT_API_BASE);
    }

    #[test]
    fn bad_timeout_in_environment_is_rejected() {
        let mut config = ClientConfig::default();
        let err = apply_env(&mut config, |key| {
            (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }

    #[test]
    fn missing_explicit_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::explicit(&temp.path().join("nope.yml"));
        let err = load_client_config(&paths, no_env).unwrap_err();
        assert!(matches!(err, IdDssError::ConfigNotFound { .. }));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".id-dss.yml");
        fs::write(&path, "timeout_secs: [unclosed").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, IdDssError::ConfigParseError { .. }));
    }

    #[test]
    fn empty_file_is_accepted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".id-dss.yml");
        fs::write(&path, "").unwrap();
        let config = load_client_config(&ConfigPaths::explicit(&path), no_env).unwrap();
        assert_eq!(config.timeout_secs, crate::config::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".id-dss.yml");
        fs::write(&path, "timeout_secs: 0").unwrap();
        let err = load_client_config(&ConfigPaths::explicit(&path), no_env).unwrap_err();
        assert!(matches!(err, IdDssError::ConfigValidationError { .. }));
    }
}
