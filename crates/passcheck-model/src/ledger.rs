use std::collections::HashMap;

use chrono::{Local, NaiveTime};
use serde::Serialize;

use crate::check::{CheckResult, Notice, Severity};
use crate::subject::SubjectKey;

/// One event of a feature run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEntry {
    Phase { title: String },
    Info { message: String },
    Check(CheckResult),
    Notice(Notice),
}

impl LedgerEntry {
    /// Failing checks and notices are the entries worth listing per subject.
    pub fn is_issue(&self) -> bool {
        match self {
            LedgerEntry::Check(check) => !check.passed(),
            LedgerEntry::Notice(_) => true,
            _ => false,
        }
    }

    pub fn subject(&self) -> Option<&SubjectKey> {
        match self {
            LedgerEntry::Check(check) => Some(&check.subject),
            LedgerEntry::Notice(notice) => notice.subject.as_ref(),
            _ => None,
        }
    }
}

/// An entry with the local wall-clock time it was recorded at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recorded {
    pub at: NaiveTime,
    #[serde(flatten)]
    pub entry: LedgerEntry,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Summary {
    /// Percentage of passed checks, 0 when nothing was checked.
    pub fn pass_rate(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.passed_checks as f64 * 100.0 / self.total_checks as f64
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed_checks > 0
    }
}

/// Issues grouped under one subject, `None` for subject-less notices.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectIssues<'a> {
    pub subject: Option<&'a SubjectKey>,
    pub entries: Vec<&'a LedgerEntry>,
}

/// Append-only record of a feature run.
///
/// Counters and the per-subject issue index are updated in the same call
/// that appends an entry, so they can never disagree with `entries`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    entries: Vec<Recorded>,
    summary: Summary,
    #[serde(skip)]
    issue_order: Vec<Option<SubjectKey>>,
    #[serde(skip)]
    issues: HashMap<Option<SubjectKey>, Vec<usize>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: CheckResult) -> &Recorded {
        self.summary.total_checks += 1;
        if result.passed() {
            self.summary.passed_checks += 1;
        } else {
            self.summary.failed_checks += 1;
        }
        self.push(LedgerEntry::Check(result))
    }

    pub fn warn(&mut self, subject: Option<SubjectKey>, message: impl Into<String>) -> &Recorded {
        self.summary.warnings += 1;
        self.push(LedgerEntry::Notice(Notice {
            severity: Severity::Warning,
            subject,
            message: message.into(),
        }))
    }

    pub fn error(&mut self, subject: Option<SubjectKey>, message: impl Into<String>) -> &Recorded {
        self.summary.errors += 1;
        self.push(LedgerEntry::Notice(Notice {
            severity: Severity::Error,
            subject,
            message: message.into(),
        }))
    }

    pub fn info(&mut self, message: impl Into<String>) -> &Recorded {
        self.push(LedgerEntry::Info {
            message: message.into(),
        })
    }

    pub fn begin_phase(&mut self, title: impl Into<String>) -> &Recorded {
        self.push(LedgerEntry::Phase {
            title: title.into(),
        })
    }

    fn push(&mut self, entry: LedgerEntry) -> &Recorded {
        let position = self.entries.len();
        if entry.is_issue() {
            let subject = entry.subject().cloned();
            let slots = self.issues.entry(subject.clone()).or_insert_with(|| {
                self.issue_order.push(subject);
                Vec::new()
            });
            slots.push(position);
        }
        self.entries.push(Recorded {
            at: Local::now().time(),
            entry,
        });
        &self.entries[position]
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn pass_rate(&self) -> f64 {
        self.summary.pass_rate()
    }

    pub fn has_failures(&self) -> bool {
        self.summary.has_failures()
    }

    pub fn entries(&self) -> &[Recorded] {
        &self.entries
    }

    pub fn checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.entries.iter().filter_map(|recorded| match &recorded.entry {
            LedgerEntry::Check(check) => Some(check),
            _ => None,
        })
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter().filter_map(|recorded| match &recorded.entry {
            LedgerEntry::Notice(notice) => Some(notice),
            _ => None,
        })
    }

    /// Failing checks and notices per subject, in first-appearance order.
    pub fn errors_by_subject(&self) -> Vec<SubjectIssues<'_>> {
        self.issue_order
            .iter()
            .map(|subject| SubjectIssues {
                subject: subject.as_ref(),
                entries: self
                    .issues
                    .get(subject)
                    .map(|positions| {
                        positions
                            .iter()
                            .map(|&position| &self.entries[position].entry)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect()
    }
}
