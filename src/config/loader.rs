//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::env::{apply_env_overrides, process_env, EnvLookup};
use crate::config::overrides::Overrides;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
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

/// Build the effective configuration.
///
/// Precedence, lowest first: built-in defaults, the TOML file at `path`,
/// `WF_SERVER`, then `overrides`. The result is validated once, at the end.
pub fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<ProxyConfig, ConfigError> {
    resolve_config_with_env(path, overrides, process_env)
}

/// [`resolve_config`] with environment variables resolved through `env`.
pub fn resolve_config_with_env(
    path: Option<&Path>,
    overrides: &Overrides,
    env: EnvLookup,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config, env);
    overrides.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load, apply environment overrides, and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    resolve_config(Some(path), &Overrides::default())
}

/// Parse TOML without touching the environment.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}
