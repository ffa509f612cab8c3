//! Real-time console narrative.

use std::io::{self, Write};

use colored::Colorize;
use passcheck_model::{LedgerEntry, Recorded, Reporter, Severity};

const RULE_WIDTH: usize = 80;

/// Prints every ledger entry as it is recorded.
///
/// Colours follow `colored`'s global override, which the CLI sets from
/// `--color`.
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
    quiet: bool,
}

impl ConsoleReporter {
    pub fn stdout(quiet: bool) -> Self {
        Self::new(io::stdout(), quiet)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::debug!(error = %err, "console write failed");
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn begin(&mut self, feature: &str) {
        if self.quiet {
            return;
        }
        let rule = "=".repeat(RULE_WIDTH);
        self.emit(&rule);
        self.emit(&format!("{}", format!("SEASON PASS AUDIT: {feature}").bold().magenta()));
        self.emit(&rule);
    }

    fn entry(&mut self, recorded: &Recorded) {
        if self.quiet {
            return;
        }
        let line = narrate(&recorded.entry);
        self.emit(&line);
    }
}

/// One coloured narrative line (or block) for an entry.
pub fn narrate(entry: &LedgerEntry) -> String {
    match entry {
        LedgerEntry::Phase { title } => {
            let rule = "-".repeat(RULE_WIDTH);
            format!("\n{rule}\n{}\n{rule}", format!("PHASE: {title}").bold().magenta())
        }
        LedgerEntry::Info { message } => format!("{} {message}", "[INFO]".blue()),
        LedgerEntry::Check(check) => {
            let status = if check.passed() {
                "✓ PASS".green().to_string()
            } else {
                "✗ FAIL".red().to_string()
            };
            let mut line = format!("{status} {}: {}", check.subject, check.label);
            if let (Some(expected), Some(actual)) = (&check.expected, &check.actual) {
                line.push_str(&format!(" (expected: {expected}, actual: {actual})"));
            }
            if let Some(details) = check.details.as_ref().filter(|_| !check.passed()) {
                line.push_str(&format!("\n  {details}"));
            }
            line
        }
        LedgerEntry::Notice(notice) => {
            let tag = match notice.severity {
                Severity::Warning => "[WARNING]".yellow(),
                Severity::Error => "[ERROR]".red(),
            };
            match &notice.subject {
                Some(subject) => format!("{tag} {subject}: {}", notice.message),
                None => format!("{tag} {}", notice.message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::strip_ansi;
    use chrono::NaiveTime;
    use passcheck_model::{CheckResult, Notice, SubjectKey};

    fn recorded(entry: LedgerEntry) -> Recorded {
        Recorded {
            at: NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
            entry,
        }
    }

    #[test]
    fn failed_check_shows_values_and_details() {
        let entry = LedgerEntry::Check(
            CheckResult::new(SubjectKey::Id(101), "AWARD_COUNT", "award count", false)
                .with_values("5", "3")
                .with_details("column award_1_qty"),
        );
        assert_eq!(
            strip_ansi(&narrate(&entry)),
            "✗ FAIL 101: award count (expected: 5, actual: 3)\n  column award_1_qty"
        );
    }

    #[test]
    fn quiet_reporter_prints_nothing() {
        let mut reporter = ConsoleReporter::new(Vec::new(), true);
        reporter.begin("lottery");
        reporter.entry(&recorded(LedgerEntry::Info {
            message: "loaded".into(),
        }));
        assert!(reporter.into_inner().is_empty());
    }

    #[test]
    fn notices_name_their_subject() {
        let mut reporter = ConsoleReporter::new(Vec::new(), false);
        reporter.entry(&recorded(LedgerEntry::Notice(Notice {
            severity: Severity::Warning,
            subject: Some(SubjectKey::from("rfm1")),
            message: "RFM document for offer rfm1 not found".into(),
        })));
        let printed = String::from_utf8(reporter.into_inner()).expect("utf-8 output");
        assert_eq!(
            strip_ansi(&printed),
            "[WARNING] rfm1: RFM document for offer rfm1 not found\n"
        );
    }
}
