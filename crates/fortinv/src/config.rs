//! CLI configuration — thin wrapper around `fortinv_config` shared types.
//!
//! Adds resolution that respects the `--config` flag.

use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fortinv_config::{Config, load_config_from, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// The config file in effect: `--config` / `FORTINV_CONFIG`, else the
/// platform default.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(fortinv_config::config_path)
}

/// Load the configuration in effect for this invocation.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&active_config_path(global))?)
}
