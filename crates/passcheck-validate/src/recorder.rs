use passcheck_model::{CheckResult, Ledger, Reporter, SubjectKey};

/// Appends to a feature run's ledger and forwards each entry to the reporter.
pub struct Recorder<'r> {
    ledger: Ledger,
    reporter: &'r mut dyn Reporter,
}

impl<'r> Recorder<'r> {
    pub fn new(feature: &str, reporter: &'r mut dyn Reporter) -> Self {
        reporter.begin(feature);
        Self {
            ledger: Ledger::new(),
            reporter,
        }
    }

    /// Record a check and return whether it passed.
    pub fn record(&mut self, result: CheckResult) -> bool {
        let passed = result.passed();
        let recorded = self.ledger.record(result);
        self.reporter.entry(recorded);
        passed
    }

    pub fn warn(&mut self, subject: Option<SubjectKey>, message: impl Into<String>) {
        let recorded = self.ledger.warn(subject, message);
        self.reporter.entry(recorded);
    }

    pub fn error(&mut self, subject: Option<SubjectKey>, message: impl Into<String>) {
        let recorded = self.ledger.error(subject, message);
        self.reporter.entry(recorded);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let recorded = self.ledger.info(message);
        self.reporter.entry(recorded);
    }

    pub fn begin_phase(&mut self, title: impl Into<String>) {
        let recorded = self.ledger.begin_phase(title);
        self.reporter.entry(recorded);
    }

    pub fn finish(self) -> Ledger {
        self.ledger
    }
}
