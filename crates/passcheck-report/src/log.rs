//! Detailed plain-text log of a feature run.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Local, NaiveTime};
use passcheck_model::{Ledger, LedgerEntry, Recorded};
use regex::Regex;

use crate::error::{ReportError, Result};

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("Invalid ANSI escape regex"));

const TIME_FORMAT: &str = "%H:%M:%S";

pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// One log line for a recorded entry.
pub fn log_line(recorded: &Recorded) -> String {
    let at = recorded.at.format(TIME_FORMAT);
    let line = match &recorded.entry {
        LedgerEntry::Phase { title } => format!("[PHASE] {at} - {title}"),
        LedgerEntry::Info { message } => format!("[INFO] {at} - {message}"),
        LedgerEntry::Check(check) => {
            let status = if check.passed() { "CHECK:OK" } else { "CHECK:FAIL" };
            let mut line = format!("[{status}] {at} - {}: {}", check.subject, check.label);
            if let (Some(expected), Some(actual)) = (&check.expected, &check.actual) {
                line.push_str(&format!(" (expected: {expected}, actual: {actual})"));
            }
            if let Some(details) = &check.details {
                line.push_str(&format!(" - {details}"));
            }
            line
        }
        LedgerEntry::Notice(notice) => match &notice.subject {
            Some(subject) => format!(
                "[{}] {at} - {subject}: {}",
                notice.severity.label(),
                notice.message
            ),
            None => format!("[{}] {at} - {}", notice.severity.label(), notice.message),
        },
    };
    strip_ansi(&line).into_owned()
}

/// The whole log: a header, one line per entry and the closing summary.
pub fn render_log(feature: &str, ledger: &Ledger, finished_at: NaiveTime) -> String {
    let rule = "=".repeat(80);
    let mut out = format!("{rule}\nSEASON PASS AUDIT: {feature}\n{rule}\n");
    for recorded in ledger.entries() {
        out.push_str(&log_line(recorded));
        out.push('\n');
    }
    let summary = ledger.summary();
    let at = finished_at.format(TIME_FORMAT);
    out.push_str(&format!(
        "[INFO] {at} - total checks: {}, passed: {} ({:.1}%), failed: {}, warnings: {}, errors: {}\n",
        summary.total_checks,
        summary.passed_checks,
        summary.pass_rate(),
        summary.failed_checks,
        summary.warnings,
        summary.errors
    ));
    out
}

pub fn write_log(path: &Path, feature: &str, ledger: &Ledger) -> Result<()> {
    let text = render_log(feature, ledger, Local::now().time());
    fs::write(path, text).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "detailed log written");
    Ok(())
}
