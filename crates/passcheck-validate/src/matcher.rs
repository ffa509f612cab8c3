//! Declarative field checks and their evaluation.

use passcheck_model::{CheckResult, RequirementRow, SubjectKey};

use crate::compare::{CompareMode, Comparison};
use crate::recorder::Recorder;

pub const PRESENT: &str = "present";
pub const ABSENT: &str = "absent";

/// The expected side of a field check, taken from a requirement row.
#[derive(Debug, Clone, PartialEq)]
pub enum Expect {
    Value(String),
    /// The requirement leaves the field empty: nothing is checked.
    Blank,
    /// The requirement holds a value that cannot be used; warned and skipped.
    Invalid { value: String, reason: String },
}

impl Expect {
    pub fn cell(row: &RequirementRow, column: &str) -> Self {
        match row.value(column) {
            Some(value) => Expect::Value(value.to_string()),
            None => Expect::Blank,
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Expect::Value(value.into())
    }
}

/// The actual side, read from the located configuration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Found(String),
    Absent,
}

impl Observed {
    pub fn is_found(&self) -> bool {
        matches!(self, Observed::Found(_))
    }
}

impl From<Option<String>> for Observed {
    fn from(value: Option<String>) -> Self {
        value.map_or(Observed::Absent, Observed::Found)
    }
}

/// A presence check declared ahead of a value check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub tag: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldCheck {
    pub tag: &'static str,
    pub label: String,
    pub expected: Expect,
    pub observed: Observed,
    pub mode: CompareMode,
    pub presence: Option<Presence>,
    pub details: Option<String>,
}

impl FieldCheck {
    pub fn new(
        tag: &'static str,
        label: impl Into<String>,
        expected: Expect,
        observed: impl Into<Observed>,
    ) -> Self {
        Self {
            tag,
            label: label.into(),
            expected,
            observed: observed.into(),
            mode: CompareMode::Exact,
            presence: None,
            details: None,
        }
    }

    pub fn mode(mut self, mode: CompareMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn presence(mut self, tag: &'static str, label: impl Into<String>) -> Self {
        self.presence = Some(Presence {
            tag,
            label: label.into(),
        });
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// What a single evaluation ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    /// No value check was recorded: blank expectation or a warning.
    Skipped,
}

pub struct Matcher;

impl Matcher {
    /// Evaluate one field check: presence first when declared, then the value.
    pub fn evaluate(recorder: &mut Recorder<'_>, subject: &SubjectKey, check: FieldCheck) -> Verdict {
        let expected = match check.expected {
            Expect::Blank => return Verdict::Skipped,
            Expect::Invalid { value, reason } => {
                recorder.warn(
                    Some(subject.clone()),
                    format!("{}: cannot check '{value}': {reason}", check.label),
                );
                return Verdict::Skipped;
            }
            Expect::Value(expected) => expected,
        };

        if let Some(presence) = check.presence {
            let found = check.observed.is_found();
            recorder.record(
                CheckResult::new(subject.clone(), presence.tag, presence.label, found)
                    .with_values(PRESENT, if found { PRESENT } else { ABSENT }),
            );
            if !found {
                return Verdict::Failed;
            }
        }

        let actual = match check.observed {
            Observed::Found(actual) => actual,
            Observed::Absent => {
                let mut result = CheckResult::new(subject.clone(), check.tag, check.label, false)
                    .with_values(expected, ABSENT);
                result.details = check.details;
                recorder.record(result);
                return Verdict::Failed;
            }
        };

        match check.mode.compare(&expected, &actual) {
            Comparison::Unparsable(reason) => {
                recorder.warn(
                    Some(subject.clone()),
                    format!("{}: check skipped, {reason}", check.label),
                );
                Verdict::Skipped
            }
            comparison => {
                let passed = comparison == Comparison::Match;
                let mut result = CheckResult::new(subject.clone(), check.tag, check.label, passed)
                    .with_values(expected, actual);
                result.details = check.details;
                recorder.record(result);
                if passed {
                    Verdict::Passed
                } else {
                    Verdict::Failed
                }
            }
        }
    }

    /// Record a bare presence check.
    pub fn presence(
        recorder: &mut Recorder<'_>,
        subject: &SubjectKey,
        tag: &'static str,
        label: impl Into<String>,
        found: bool,
    ) -> bool {
        recorder.record(
            CheckResult::new(subject.clone(), tag, label, found)
                .with_values(PRESENT, if found { PRESENT } else { ABSENT }),
        )
    }

    /// Record a check that passes when the entry is absent.
    pub fn absence(
        recorder: &mut Recorder<'_>,
        subject: &SubjectKey,
        tag: &'static str,
        label: impl Into<String>,
        found: bool,
    ) -> bool {
        recorder.record(
            CheckResult::new(subject.clone(), tag, label, !found)
                .with_values(ABSENT, if found { PRESENT } else { ABSENT }),
        )
    }

    /// Run `checks` against a located record. A missing record yields one
    /// warning and no checks; its failing presence result belongs to the
    /// presence phase.
    pub fn with_record<T: ?Sized>(
        recorder: &mut Recorder<'_>,
        subject: &SubjectKey,
        record: Option<&T>,
        what: &str,
        checks: impl FnOnce(&mut Recorder<'_>, &T),
    ) {
        match record {
            Some(record) => checks(recorder, record),
            None => recorder.warn(
                Some(subject.clone()),
                format!("{what} {subject} not found, content checks skipped"),
            ),
        }
    }
}
