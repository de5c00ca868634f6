//! Configuration file loading with precedence handling.

use crate::layout::FontMetrics;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CANVAS_LAYOUT_CONFIG";
/// Environment variable overriding the edit lock idle window, in milliseconds.
pub const IDLE_MS_ENV: &str = "CANVAS_LAYOUT_IDLE_MS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permissions, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A setting from the environment could not be parsed.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Setting that failed to parse.
        key: String,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/canvas-layout/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Idle time after the last edit before an edit lock releases.
    #[serde(default)]
    pub idle_release_ms: Option<u64>,

    /// Display-only zoom of the visible layer.
    #[serde(default)]
    pub display_scale: Option<f64>,

    /// Column count forced over the template's default.
    #[serde(default)]
    pub column_count: Option<u32>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Font metrics for the headless text oracle.
    #[serde(default)]
    pub text_metrics: Option<TextMetricsSection>,
}

/// Font metrics section from TOML.
///
/// ```toml
/// [text_metrics]
/// cell_width_px = 7.5
/// body_line_height_px = 17.0
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TextMetricsSection {
    /// Average advance of one character cell.
    #[serde(default)]
    pub cell_width_px: Option<f64>,
    /// Line height of body and item text.
    #[serde(default)]
    pub body_line_height_px: Option<f64>,
    /// Line height of section headings.
    #[serde(default)]
    pub heading_line_height_px: Option<f64>,
    /// Vertical gap after each block.
    #[serde(default)]
    pub block_spacing_px: Option<f64>,
}

impl TextMetricsSection {
    fn merge_over(self, defaults: FontMetrics) -> FontMetrics {
        FontMetrics {
            cell_width_px: self.cell_width_px.unwrap_or(defaults.cell_width_px),
            body_line_height_px: self
                .body_line_height_px
                .unwrap_or(defaults.body_line_height_px),
            heading_line_height_px: self
                .heading_line_height_px
                .unwrap_or(defaults.heading_line_height_px),
            block_spacing_px: self.block_spacing_px.unwrap_or(defaults.block_spacing_px),
        }
    }
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Idle window of the edit lock.
    pub idle_release: Duration,
    /// Display-only zoom; never feeds measurement.
    pub display_scale: f64,
    /// `None` keeps the template's column count.
    pub column_count: Option<u32>,
    /// Metrics for the headless text oracle.
    pub font_metrics: FontMetrics,
    /// Where tracing output is appended.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            idle_release: crate::editing::DEFAULT_IDLE_RELEASE,
            display_scale: 1.0,
            column_count: None,
            font_metrics: FontMetrics::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/canvas-layout/canvas-layout.log` on Unix-like
/// systems, or the platform state directory elsewhere. Falls back to the
/// current directory when no state directory exists.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("canvas-layout").join("canvas-layout.log")
    } else {
        PathBuf::from("canvas-layout.log")
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
/// Returns `~/.config/canvas-layout/config.toml` on Unix, the platform config
/// directory elsewhere, or `None` when it cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("canvas-layout").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CANVAS_LAYOUT_CONFIG` environment variable
/// 3. Default path `~/.config/canvas-layout/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
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

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CANVAS_LAYOUT_IDLE_MS`: Override the edit lock idle window
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the variable is set but is not
/// a whole number of milliseconds.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(IDLE_MS_ENV) {
        let millis: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidValue {
                key: IDLE_MS_ENV.to_string(),
                reason: e.to_string(),
            }
        })?;
        config.idle_release = Duration::from_millis(millis);
    }

    Ok(config)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        idle_release: config
            .idle_release_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.idle_release),
        display_scale: config.display_scale.unwrap_or(defaults.display_scale),
        column_count: config.column_count.or(defaults.column_count),
        font_metrics: config
            .text_metrics
            .unwrap_or_default()
            .merge_over(defaults.font_metrics),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    scale_override: Option<f64>,
    columns_override: Option<u32>,
    idle_ms_override: Option<u64>,
) -> ResolvedConfig {
    if let Some(scale) = scale_override {
        config.display_scale = scale;
    }

    if let Some(columns) = columns_override {
        config.column_count = Some(columns);
    }

    if let Some(millis) = idle_ms_override {
        config.idle_release = Duration::from_millis(millis);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
