use crate::ledger::Recorded;

/// Receives ledger entries as they are recorded.
///
/// Validators never print; the console narrative and any other live view
/// are implementations of this trait.
pub trait Reporter {
    /// Called once before the first entry of a feature run.
    fn begin(&mut self, _feature: &str) {}

    fn entry(&mut self, recorded: &Recorded);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn entry(&mut self, _recorded: &Recorded) {}
}
