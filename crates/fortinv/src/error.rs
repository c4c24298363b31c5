//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fortinv_config::ConfigError;
use fortinv_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const INPUT: i32 = 4;
    pub const DATA: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Could not read {path}")]
    #[diagnostic(
        code(fortinv::input_unreadable),
        help("Check that the file exists and is readable.")
    )]
    InputUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON")]
    #[diagnostic(
        code(fortinv::input_json),
        help("The file must hold a JSON array of records or an API response envelope.")
    )]
    InputJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} does not contain a list of records")]
    #[diagnostic(
        code(fortinv::input_shape),
        help(
            "Expected a JSON array, or an object with one of: \
             assets, results, dataSet, data, result[0].data"
        )
    )]
    InputShape { path: String },

    // ── Engine ───────────────────────────────────────────────────────
    #[error("Unification failed: {0}")]
    #[diagnostic(
        code(fortinv::pipeline),
        help("The input does not have the structure this source system exports.")
    )]
    Pipeline(#[source] CoreError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fortinv::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(fortinv::config),
        help("Inspect the file with: fortinv config show\nOr recreate it with: fortinv config init --force")
    )]
    Config(#[from] ConfigError),

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(fortinv::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to write CSV: {0}")]
    #[diagnostic(code(fortinv::csv))]
    Csv(#[from] csv::Error),

    #[error("Failed to write JSON: {0}")]
    #[diagnostic(code(fortinv::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputUnreadable { .. } | Self::InputJson { .. } | Self::InputShape { .. } => {
                exit_code::INPUT
            }
            Self::Pipeline(_) => exit_code::DATA,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config(_) | Self::ConfigExists { .. } => exit_code::CONFIG,
            Self::Io(_) | Self::Csv(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::Pipeline(err)
    }
}
