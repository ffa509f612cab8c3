//! CSV issue report and JSON ledger export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use passcheck_model::{Ledger, LedgerEntry, Recorded, Summary};
use serde::Serialize;

use crate::error::{ReportError, Result};

pub const CSV_HEADER: [&str; 6] = ["Subject", "Check", "Result", "Expected", "Actual", "Details"];

/// Write failing checks and notices grouped by subject.
pub fn write_csv<W: Write>(out: W, ledger: &Ledger) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for group in ledger.errors_by_subject() {
        let subject = group
            .subject
            .map(ToString::to_string)
            .unwrap_or_default();
        for entry in group.entries {
            match entry {
                LedgerEntry::Check(check) => writer.write_record([
                    subject.as_str(),
                    check.label.as_str(),
                    check.outcome.label(),
                    check.expected.as_deref().unwrap_or_default(),
                    check.actual.as_deref().unwrap_or_default(),
                    check.details.as_deref().unwrap_or_default(),
                ])?,
                LedgerEntry::Notice(notice) => {
                    let label = notice.severity.label();
                    writer.write_record([
                        subject.as_str(),
                        label.to_lowercase().as_str(),
                        label,
                        "",
                        "",
                        notice.message.as_str(),
                    ])?;
                }
                LedgerEntry::Phase { .. } | LedgerEntry::Info { .. } => {}
            }
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, ledger: &Ledger) -> Result<()> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, ledger).map_err(|source| ReportError::CsvWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "CSV report written");
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    feature: &'a str,
    summary: Summary,
    pass_rate: f64,
    entries: &'a [Recorded],
}

/// The full ledger of a run as pretty-printed JSON.
pub fn ledger_json(feature: &str, ledger: &Ledger) -> Result<String> {
    let summary = ledger.summary();
    let report = JsonReport {
        feature,
        summary,
        pass_rate: summary.pass_rate(),
        entries: ledger.entries(),
    };
    serde_json::to_string_pretty(&report).map_err(|source| ReportError::JsonEncode { source })
}
