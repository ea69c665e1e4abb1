//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BffConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `upstream.base_url`.
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
/// Overrides `upstream.bearer_token`. An empty value means "not configured".
pub const ENV_BACKEND_BEARER_TOKEN: &str = "BACKEND_BEARER_TOKEN";
/// Overrides `environment` (`production` / `development`).
pub const ENV_BFF_ENV: &str = "BFF_ENV";
/// Overrides `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "BFF_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {variable}: {reason}")]
    Env { variable: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<BffConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: BffConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

impl BffConfig {
    /// Defaults plus environment overrides, validated.
    /// Used when no configuration file is given.
    pub fn from_env_defaults() -> Result<Self, ConfigError> {
        let mut config = BffConfig::default();
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut BffConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BACKEND_URL) {
        config.upstream.base_url = url;
    }

    if let Some(token) = lookup(ENV_BACKEND_BEARER_TOKEN) {
        config.upstream.bearer_token = Some(token);
    }
    // `bearer_token = ""` in a file means the same as leaving it out.
    if config
        .upstream
        .bearer_token
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        config.upstream.bearer_token = None;
    }

    if let Some(env) = lookup(ENV_BFF_ENV) {
        config.environment = env.parse().map_err(|reason| ConfigError::Env {
            variable: ENV_BFF_ENV,
            reason,
        })?;
    }

    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = BffConfig::default();
        config.upstream.bearer_token = Some("from-file".into());

        apply_env_overrides(
            &mut config,
            lookup_from(&[
                (ENV_BACKEND_URL, "http://10.0.0.5:3001/api"),
                (ENV_BACKEND_BEARER_TOKEN, "from-env"),
                (ENV_BFF_ENV, "production"),
                (ENV_BIND_ADDRESS, "127.0.0.1:4000"),
            ]),
        )
        .unwrap();

        assert_eq!(config.upstream.base_url, "http://10.0.0.5:3001/api");
        assert_eq!(config.upstream.bearer_token.as_deref(), Some("from-env"));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn empty_token_means_unset() {
        let mut config = BffConfig::default();
        apply_env_overrides(&mut config, lookup_from(&[(ENV_BACKEND_BEARER_TOKEN, "")])).unwrap();
        assert!(config.upstream.bearer_token.is_none());
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let mut config = BffConfig::default();
        let err = apply_env_overrides(&mut config, lookup_from(&[(ENV_BFF_ENV, "staging")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { variable: ENV_BFF_ENV, .. }));
    }

    #[test]
    fn load_config_reports_validation_errors() {
        let path = std::env::temp_dir().join(format!("wallboard-bff-{}.toml", std::process::id()));
        fs::write(&path, "[proxy]\nmount_path = \"bff\"\n").unwrap();

        let result = load_config(&path);
        let _ = fs::remove_file(&path);

        match result {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.contains(&ValidationError::InvalidMountPath("bff".into())));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
