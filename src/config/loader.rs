//! Configuration file loading with precedence handling.

use crate::model::{HistogramOptions, LogType, UnknownLogType};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LOGSCOPE_CONFIG";

/// Environment variable overriding the initial log type.
pub const LOG_TYPE_ENV: &str = "LOGSCOPE_LOG_TYPE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// `default_log_type` or `LOGSCOPE_LOG_TYPE` names no log type.
    #[error(transparent)]
    UnknownLogType(#[from] UnknownLogType),
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/logscope/config.toml`.
///
/// ```toml
/// default_log_type = "audit"
/// auto_refresh_seconds = 30
///
/// [histogram_colors]
/// ERROR = "#FF0000"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Log type shown on startup ("service" or "audit").
    #[serde(default)]
    pub default_log_type: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Auto refresh period; absent means auto refresh is off.
    #[serde(default)]
    pub auto_refresh_seconds: Option<u64>,

    /// Level → colour overrides for the histogram legend.
    #[serde(default)]
    pub histogram_colors: Option<BTreeMap<String, String>>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Log type activated on startup.
    pub default_log_type: LogType,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Auto refresh period in seconds.
    pub auto_refresh_seconds: Option<u64>,
    /// Histogram colour overrides.
    pub histogram_colors: BTreeMap<String, String>,
}

impl ResolvedConfig {
    /// Default histogram options with the configured colours applied.
    pub fn histogram_options(&self) -> HistogramOptions {
        HistogramOptions::default().with_overrides(&self.histogram_colors)
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            default_log_type: LogType::Service,
            log_file_path: default_log_path(),
            auto_refresh_seconds: None,
            histogram_colors: BTreeMap::new(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/logscope/logscope.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("logscope").join("logscope.log"),
        None => PathBuf::from("logscope.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/logscope/config.toml` on Unix, appropriate path on other
/// platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("logscope").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LOGSCOPE_CONFIG` environment variable
/// 3. Default path `~/.config/logscope/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// # Errors
///
/// Returns `ConfigError::UnknownLogType` if `default_log_type` is not a log
/// type.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let default_log_type = match config.default_log_type {
        Some(name) => name.parse()?,
        None => defaults.default_log_type,
    };

    Ok(ResolvedConfig {
        default_log_type,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        auto_refresh_seconds: config.auto_refresh_seconds.or(defaults.auto_refresh_seconds),
        histogram_colors: config.histogram_colors.unwrap_or(defaults.histogram_colors),
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for `LOGSCOPE_LOG_TYPE`.
///
/// # Errors
///
/// Returns `ConfigError::UnknownLogType` if the variable is set to something
/// that is not a log type.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(log_type) = std::env::var(LOG_TYPE_ENV) {
        config.default_log_type = log_type.parse()?;
    }

    Ok(config)
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    log_type_override: Option<LogType>,
) -> ResolvedConfig {
    if let Some(log_type) = log_type_override {
        config.default_log_type = log_type;
    }

    config
}

/// Run the whole precedence chain.
///
/// # Errors
///
/// Returns the first `ConfigError` of any stage.
pub fn resolve(
    config_path: Option<PathBuf>,
    log_type_override: Option<LogType>,
) -> Result<ResolvedConfig, ConfigError> {
    let config_file = load_config_with_precedence(config_path)?;
    let merged = merge_config(config_file)?;
    let with_env = apply_env_overrides(merged)?;
    Ok(apply_cli_overrides(with_env, log_type_override))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
