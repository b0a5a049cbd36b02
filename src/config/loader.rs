//! Configuration loading from disk and the environment.
//!
//! Precedence, highest first: process environment, `.env` in the working
//! directory, TOML file, built-in defaults.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::WatchdogConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Dotenv file picked up from the working directory.
pub const DOTENV_FILE: &str = ".env";

/// Load, overlay `.env` and the process environment, and validate.
///
/// Without a path only defaults and the environment are used.
pub fn load_config(path: Option<&Path>) -> Result<WatchdogConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => WatchdogConfig::default(),
    };

    let dotenv = read_dotenv(Path::new(DOTENV_FILE))?;
    apply_env(&mut config, layered(|var| std::env::var(var).ok(), &dotenv))?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document. Missing keys take their defaults.
pub fn parse_config(content: &str) -> Result<WatchdogConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read a dotenv file into a map. A missing file is an empty map.
///
/// The process environment is left untouched.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    dotenvy::from_path_iter(path)?
        .map(|item| item.map_err(ConfigError::from))
        .collect()
}

/// Look `var` up in `primary`, then in `fallback`.
fn layered<'a, F>(
    primary: F,
    fallback: &'a HashMap<String, String>,
) -> impl Fn(&str) -> Option<String> + 'a
where
    F: Fn(&str) -> Option<String> + 'a,
{
    move |var| primary(var).or_else(|| fallback.get(var).cloned())
}

/// Overlay environment variables onto `config`. Set variables win over the file.
pub fn apply_env<F>(config: &mut WatchdogConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let device = &mut config.device;
    overlay_string(&lookup, "FRITZ_HOST", &mut device.host);
    overlay_parsed(&lookup, "FRITZ_PORT", &mut device.port)?;
    overlay_string(&lookup, "FRITZ_USER", &mut device.user);
    overlay_string(&lookup, "FRITZ_PASSWORD", &mut device.password);
    overlay_string(&lookup, "TARGET_SVC", &mut device.service);
    overlay_parsed(&lookup, "FRITZ_TIMEOUT_SEC", &mut device.timeout_secs)?;

    let watchdog = &mut config.watchdog;
    overlay_parsed(&lookup, "CHECK_EVERY_SEC", &mut watchdog.check_every_secs)?;
    overlay_parsed(&lookup, "MAX_BAD_CYCLES", &mut watchdog.max_bad_cycles)?;
    overlay_parsed(&lookup, "DEFAULT_REBOOT_DELAY", &mut watchdog.reboot_delay_secs)?;
    overlay_parsed(&lookup, "REBOOT_FROM_TIER", &mut watchdog.reboot_from_tier)?;

    let observability = &mut config.observability;
    overlay_string(&lookup, "LOG_LEVEL", &mut observability.log_level);
    overlay_parsed(&lookup, "LOG_ON_CYCLE", &mut observability.log_on_cycle)?;
    if let Some(value) = lookup("LOG_JSON") {
        observability.log_json = parse_bool("LOG_JSON", &value)?;
    }
    if let Some(value) = lookup("METRICS_ENABLED") {
        observability.metrics_enabled = parse_bool("METRICS_ENABLED", &value)?;
    }
    overlay_string(&lookup, "METRICS_ADDRESS", &mut observability.metrics_address);

    Ok(())
}

fn overlay_string<F>(lookup: &F, var: &'static str, target: &mut String)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(var) {
        *target = value;
    }
}

fn overlay_parsed<F, T>(lookup: &F, var: &'static str, target: &mut T) -> Result<(), ConfigError>
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

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Env {
            var,
            value: value.to_string(),
        }),
    }
}
