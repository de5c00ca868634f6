//! Configuration module.
//!
//! Settings come from, in increasing precedence: built-in defaults, an
//! optional TOML file, environment variables, and command-line flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    ConfigError, ConfigFile, ResolvedConfig, TextMetricsSection,
};
