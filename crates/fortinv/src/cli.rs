//! Clap derive structures for the `fortinv` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! This file is also compiled by `build.rs` for man page generation, so it
//! may only depend on clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fortinv -- unify Fortinet device inventories into one canonical export
#[derive(Debug, Parser)]
#[command(
    name = "fortinv",
    version,
    about = "Unify Fortinet device records into one canonical inventory",
    long_about = "Reads device records exported from FortiManager, FortiCloud or TopDesk\n\
        and rewrites them into a single 60-column inventory format.\n\n\
        One export covers one source system and one device type.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "FORTINV_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for summaries and listings
    #[arg(
        long,
        short = 'o',
        env = "FORTINV_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Log line format (overrides the config file)
    #[arg(long, env = "FORTINV_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Unify one source batch and write the canonical export
    #[command(alias = "x")]
    Export(ExportArgs),

    /// Print the canonical column header
    Schema,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EXPORT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// FortiManager device database
    #[value(alias = "fmg")]
    Fortimanager,
    /// FortiCloud asset management
    #[value(alias = "fc")]
    Forticloud,
    /// TopDesk asset management
    #[value(alias = "td")]
    Topdesk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceTypeArg {
    /// FortiGate firewalls
    #[value(alias = "fortigate")]
    Firewall,
    /// FortiSwitch switches
    #[value(alias = "fortiswitch")]
    Switch,
    /// FortiAP access points
    #[value(alias = "fortiap", alias = "ap")]
    AccessPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    Csv,
    /// A JSON array of objects keyed by column name
    Json,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Source system the records were exported from
    #[arg(long, short = 's')]
    pub source: SourceArg,

    /// Device type of the records
    #[arg(long, short = 't')]
    pub device_type: DeviceTypeArg,

    /// JSON file with the device records (array or API envelope)
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// JSON file with controller (firewall) records for parent lookup
    #[arg(long)]
    pub controllers: Option<PathBuf>,

    /// JSON file with FortiCloud account records
    #[arg(long)]
    pub accounts: Option<PathBuf>,

    /// Output file, or '-' for stdout [default: generated name in output_dir]
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Export file format
    #[arg(long, short = 'f', default_value = "csv")]
    pub format: ExportFormat,

    /// Run timestamp (RFC 3339) used for expiry checks and Last Updated
    #[arg(long)]
    pub as_of: Option<String>,

    /// Keep duplicate rows
    #[arg(long)]
    pub no_dedupe: bool,

    /// CSV field delimiter (overrides the config file)
    #[arg(long)]
    pub delimiter: Option<char>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display current resolved configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Config key (output_dir, delimiter, dedupe, log_format)
        key: String,

        /// Value to set
        value: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
