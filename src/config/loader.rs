//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{LogFormat, StackConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

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

/// Load configuration: optional TOML file, then process environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<StackConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => StackConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so callers can supply a fixed map.
pub fn apply_env<F>(config: &mut StackConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let db = &mut config.database;
    set_string(&lookup, "DB_HOST", &mut db.host);
    set_parsed(&lookup, "DB_PORT", &mut db.port)?;
    set_string(&lookup, "DB_NAME", &mut db.name);
    set_string(&lookup, "DB_USER", &mut db.user);
    set_string(&lookup, "DB_PASSWORD", &mut db.password);
    set_parsed(&lookup, "DB_MIN_CONN", &mut db.min_connections)?;
    set_parsed(&lookup, "DB_MAX_CONN", &mut db.max_connections)?;
    set_parsed(&lookup, "DB_ACQUIRE_TIMEOUT", &mut db.acquire_timeout_secs)?;

    set_string(&lookup, "BACKEND_BIND_ADDRESS", &mut config.data_service.bind_address);

    let gw = &mut config.gateway;
    set_string(&lookup, "FRONTEND_BIND_ADDRESS", &mut gw.bind_address);
    set_string(&lookup, "BACKEND_BASE_URL", &mut gw.backend_base_url);
    set_parsed(&lookup, "REQUEST_TIMEOUT", &mut gw.request_timeout_secs)?;
    set_parsed(&lookup, "READY_TIMEOUT", &mut gw.ready_timeout_secs)?;

    let obs = &mut config.observability;
    set_string(&lookup, "LOG_LEVEL", &mut obs.log_level);
    if let Some(value) = lookup("LOG_FORMAT") {
        obs.log_format = match value.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            _ => return Err(ConfigError::Env { var: "LOG_FORMAT", value }),
        };
    }

    Ok(())
}

fn set_string<F>(lookup: &F, var: &'static str, target: &mut String)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(var) {
        *target = value;
    }
}

fn set_parsed<F, T>(lookup: &F, var: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(var) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var, value })?;
    }
    Ok(())
}
