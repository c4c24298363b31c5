//! Export handler: read a source batch, unify it, write CSV or JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, info};

use fortinv_core::{CanonicalRecord, DeviceType, Pipeline, RunReport, SourceBatch, SourceSystem, header};

use crate::cli::{DeviceTypeArg, ExportArgs, ExportFormat, GlobalOpts, SourceArg};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::read_records;

/// Marker for `--out -`.
const STDOUT: &str = "-";

// ── Argument conversion ─────────────────────────────────────────────

impl From<SourceArg> for SourceSystem {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Fortimanager => Self::FortiManager,
            SourceArg::Forticloud => Self::FortiCloud,
            SourceArg::Topdesk => Self::TopDesk,
        }
    }
}

impl From<DeviceTypeArg> for DeviceType {
    fn from(arg: DeviceTypeArg) -> Self {
        match arg {
            DeviceTypeArg::Firewall => Self::Firewall,
            DeviceTypeArg::Switch => Self::Switch,
            DeviceTypeArg::AccessPoint => Self::AccessPoint,
        }
    }
}

fn parse_as_of(raw: Option<&str>) -> Result<DateTime<Utc>, CliError> {
    raw.map_or_else(
        || Ok(Utc::now()),
        |s| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| CliError::Validation {
                    field: "as-of".into(),
                    reason: format!("'{s}' is not an RFC 3339 timestamp: {e}"),
                })
        },
    )
}

/// `<prefix>_<family>_devices_<YYYYMMDD_HHMMSS>.<ext>`
fn default_file_name(
    source: SourceSystem,
    device_type: DeviceType,
    as_of: &DateTime<Utc>,
    format: ExportFormat,
) -> String {
    let ext = match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Json => "json",
    };
    format!(
        "{}_{}_devices_{}.{ext}",
        source.file_prefix(),
        device_type.file_stem(),
        as_of.format("%Y%m%d_%H%M%S")
    )
}

// ── Writers ─────────────────────────────────────────────────────────

fn write_csv<W: Write>(out: W, rows: &[CanonicalRecord], delimiter: u8) -> Result<(), CliError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);
    writer.write_record(header())?;
    for row in rows {
        writer.write_record(row.values())?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<W: Write>(mut out: W, rows: &[CanonicalRecord]) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut out, rows)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn write_rows<W: Write>(
    out: W,
    rows: &[CanonicalRecord],
    format: ExportFormat,
    delimiter: u8,
) -> Result<(), CliError> {
    match format {
        ExportFormat::Csv => write_csv(out, rows, delimiter),
        ExportFormat::Json => write_json(out, rows),
    }
}

// ── Summary ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ExportSummary {
    source: SourceSystem,
    device_type: DeviceType,
    input_records: usize,
    expanded_rows: usize,
    rows: usize,
    skipped: usize,
    duplicates_removed: usize,
    output: String,
}

impl ExportSummary {
    fn new(report: &RunReport, output: String) -> Self {
        Self {
            source: report.source,
            device_type: report.device_type,
            input_records: report.input_records,
            expanded_rows: report.expanded_rows,
            rows: report.records.len(),
            skipped: report.skipped.len(),
            duplicates_removed: report.duplicates_removed,
            output,
        }
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Device Type")]
    device_type: String,
    #[tabled(rename = "Input")]
    input: usize,
    #[tabled(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Duplicates")]
    duplicates: usize,
    #[tabled(rename = "Output")]
    output: String,
}

fn summary_row(s: &ExportSummary) -> SummaryRow {
    SummaryRow {
        source: s.source.to_string(),
        device_type: s.device_type.asset_type().into(),
        input: s.input_records,
        rows: s.rows,
        skipped: s.skipped,
        duplicates: s.duplicates_removed,
        output: s.output.clone(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ExportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load(global)?;
    if let Some(delimiter) = args.delimiter {
        cfg.defaults.delimiter = delimiter;
        cfg.validate()?;
    }

    let source = SourceSystem::from(args.source);
    let device_type = DeviceType::from(args.device_type);
    let as_of = parse_as_of(args.as_of.as_deref())?;

    let mut batch = SourceBatch::new(source, device_type, read_records(&args.input)?);
    if let Some(path) = &args.controllers {
        batch = batch.with_controllers(read_records(path)?);
    }
    if let Some(path) = &args.accounts {
        batch = batch.with_accounts(read_records(path)?);
    }
    debug!(
        records = batch.records.len(),
        controllers = batch.controllers.len(),
        accounts = batch.accounts.len(),
        "input loaded"
    );

    let pipeline = Pipeline::new(as_of).with_dedupe(cfg.defaults.dedupe && !args.no_dedupe);
    let report = pipeline.run(&batch)?;

    let destination = match &args.out {
        Some(path) if path == Path::new(STDOUT) => None,
        Some(path) => Some(path.clone()),
        None => Some(
            cfg.defaults
                .output_dir
                .join(default_file_name(source, device_type, &as_of, args.format)),
        ),
    };

    let Some(path) = destination else {
        // Rows own stdout; the summary would corrupt them.
        write_rows(io::stdout().lock(), &report.records, args.format, cfg.delimiter_byte())?;
        return Ok(());
    };

    write_to_file(&path, &report.records, args.format, cfg.delimiter_byte())?;
    info!(path = %path.display(), rows = report.records.len(), "export written");

    let color = output::should_color(&global.color);
    output::status(
        &format!("Wrote {} rows to {}", report.records.len(), path.display()),
        false,
        color,
        global.quiet,
    );
    if !report.skipped.is_empty() {
        output::status(
            &format!(
                "{} records skipped: no serial number or name",
                report.skipped.len()
            ),
            true,
            color,
            global.quiet,
        );
    }

    let summary = ExportSummary::new(&report, path.display().to_string());
    let out = output::render_list(
        &global.output,
        std::slice::from_ref(&summary),
        summary_row,
        |s| s.output.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn write_to_file(
    path: &Path,
    rows: &[CanonicalRecord],
    format: ExportFormat,
    delimiter: u8,
) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_rows(BufWriter::new(file), rows, format, delimiter)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fortinv_core::Field;

    #[test]
    fn default_name_uses_prefix_family_and_timestamp() {
        let as_of = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            default_file_name(SourceSystem::FortiManager, DeviceType::Switch, &as_of, ExportFormat::Csv),
            "fmg_fortiswitch_devices_20250203_040506.csv"
        );
        assert_eq!(
            default_file_name(SourceSystem::TopDesk, DeviceType::AccessPoint, &as_of, ExportFormat::Json),
            "td_fortiap_devices_20250203_040506.json"
        );
    }

    #[test]
    fn as_of_must_be_rfc3339() {
        let t = parse_as_of(Some("2025-01-01T00:00:00+01:00")).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap());
        assert!(matches!(
            parse_as_of(Some("yesterday")),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let mut row = CanonicalRecord::new();
        row.set(Field::SerialNumber, "FGT60F0000000001");
        row.set(Field::Description, "lobby, ground floor");

        let mut buf = Vec::new();
        write_csv(&mut buf, &[row], b',').unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines.first().unwrap().starts_with("Serial Number,Device Name,Hostname"));
        assert!(lines.get(1).unwrap().starts_with("FGT60F0000000001,,,,\"lobby, ground floor\""));
    }
}
