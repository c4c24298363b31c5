//! Config subcommand handlers.

use std::path::PathBuf;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, save_config_to};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn parse_bool(field: &str, value: &str) -> Result<bool, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

fn parse_char(field: &str, value: &str) -> Result<char, CliError> {
    let unescaped = if value == "\\t" { "\t" } else { value };
    let mut chars = unescaped.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CliError::Validation {
            field: field.into(),
            reason: "must be a single character".into(),
        }),
    }
}

/// Apply `key = value` to `cfg`.
fn set_value(cfg: &mut Config, key: &str, value: &str) -> Result<(), CliError> {
    let d = &mut cfg.defaults;
    match key {
        "output_dir" | "output-dir" => d.output_dir = PathBuf::from(value),
        "delimiter" => d.delimiter = parse_char("delimiter", value)?,
        "dedupe" => d.dedupe = parse_bool("dedupe", value)?,
        "log_format" | "log-format" => d.log_format = value.to_owned(),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: output_dir, delimiter, \
                     dedupe, log_format"
                ),
            });
        }
    }
    cfg.validate()?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_config_path(global);
    let color = output::should_color(&global.color);

    match args.command {
        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|_| format!("{c:#?}")),
                |_| path.display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            save_config_to(&Config::default(), &path)?;
            output::status(
                &format!("Configuration written to {}", path.display()),
                false,
                color,
                global.quiet,
            );
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load(global)?;
            set_value(&mut cfg, &key, &value)?;
            save_config_to(&cfg, &path)?;
            output::status(&format!("Set {key} = {value}"), false, color, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_known_keys() {
        let mut cfg = Config::default();
        set_value(&mut cfg, "delimiter", "\\t").unwrap();
        set_value(&mut cfg, "dedupe", "false").unwrap();
        set_value(&mut cfg, "output-dir", "/srv/exports").unwrap();
        assert_eq!(cfg.defaults.delimiter, '\t');
        assert!(!cfg.defaults.dedupe);
        assert_eq!(cfg.defaults.output_dir, PathBuf::from("/srv/exports"));
    }

    #[test]
    fn reject_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            set_value(&mut cfg, "color", "never"),
            Err(CliError::Validation { .. })
        ));
        assert!(matches!(
            set_value(&mut cfg, "delimiter", ";;"),
            Err(CliError::Validation { .. })
        ));
        assert!(matches!(
            set_value(&mut cfg, "log_format", "xml"),
            Err(CliError::Config(_))
        ));
    }
}
