//! Shared configuration for the fortinv tools.
//!
//! A TOML file in the platform config directory, overlaid with `FORTINV_*`
//! environment variables. Nested keys use a double underscore, so
//! `FORTINV_DEFAULTS__DEDUPE=false` sets `defaults.dedupe`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Export defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// Directory for generated export files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// CSV field delimiter. Must be a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Collapse duplicate rows before writing.
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,

    /// Log line format: "text" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            delimiter: default_delimiter(),
            dedupe: default_dedupe(),
            log_format: default_log_format(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_delimiter() -> char {
    ','
}
fn default_dedupe() -> bool {
    true
}
fn default_log_format() -> String {
    "text".into()
}

impl Config {
    /// Reject values the exporter cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defaults;
        if !d.delimiter.is_ascii() || d.delimiter.is_ascii_alphanumeric() || d.delimiter == '"' {
            return Err(ConfigError::Validation {
                field: "defaults.delimiter".into(),
                reason: format!("'{}' is not a usable CSV delimiter", d.delimiter),
            });
        }
        if !matches!(d.log_format.as_str(), "text" | "json") {
            return Err(ConfigError::Validation {
                field: "defaults.log_format".into(),
                reason: format!("expected 'text' or 'json', got '{}'", d.log_format),
            });
        }
        Ok(())
    }

    /// The delimiter as the single byte the CSV writer expects.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(u32::from(self.defaults.delimiter)).unwrap_or(b',')
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fortinv", "fortinv").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fortinv");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from `path` + environment. A missing file is not an
/// error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FORTINV_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    cfg.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
