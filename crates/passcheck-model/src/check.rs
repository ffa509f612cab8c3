use serde::{Deserialize, Serialize};

use crate::subject::SubjectKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    Fail,
}

impl CheckOutcome {
    pub fn label(self) -> &'static str {
        match self {
            CheckOutcome::Pass => "PASS",
            CheckOutcome::Fail => "FAIL",
        }
    }
}

/// The outcome of one field comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub subject: SubjectKey,
    /// Stable machine tag, e.g. `AWARD_COUNT`.
    pub tag: &'static str,
    /// Human-readable label shown in the narrative and reports.
    pub label: String,
    pub outcome: CheckOutcome,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn new(
        subject: SubjectKey,
        tag: &'static str,
        label: impl Into<String>,
        passed: bool,
    ) -> Self {
        Self {
            subject,
            tag,
            label: label.into(),
            outcome: if passed {
                CheckOutcome::Pass
            } else {
                CheckOutcome::Fail
            },
            expected: None,
            actual: None,
            details: None,
        }
    }

    pub fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Pass
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

/// A warning or error that is not itself a check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub subject: Option<SubjectKey>,
    pub message: String,
}
