//! Configuration module.
//!
//! Settings are resolved with the precedence chain
//! defaults → config file → environment → CLI flags; see [`loader`].

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, resolve, ConfigError, ConfigFile,
    ResolvedConfig, CONFIG_ENV, LOG_TYPE_ENV,
};
