use std::path::PathBuf;

use passcheck_model::Ledger;
use passcheck_validate::Feature;

/// Outcome of one feature audit as shown in the final summary.
#[derive(Debug)]
pub struct FeatureRun {
    pub feature: Feature,
    pub ledger: Ledger,
    /// Detailed log, when it was written.
    pub log: Option<PathBuf>,
    /// CSV report, when it was written.
    pub report: Option<PathBuf>,
    /// Report-writing failures; they do not change the exit status.
    pub errors: Vec<String>,
    pub json: bool,
}

impl FeatureRun {
    pub fn has_failures(&self) -> bool {
        self.ledger.has_failures()
    }
}
