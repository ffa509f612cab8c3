//! Presentation of audit results.
//!
//! - **Console**: the real-time narrative, a [`Reporter`] implementation
//! - **Detailed log**: one prefixed, timestamped line per ledger entry
//! - **CSV**: failing checks and notices grouped by subject
//! - **JSON**: the whole ledger with its summary

mod console;
mod error;
mod export;
mod log;

pub use console::{ConsoleReporter, narrate};
pub use error::{ReportError, Result};
pub use export::{CSV_HEADER, ledger_json, write_csv, write_csv_file};
pub use log::{log_line, render_log, strip_ansi, write_log};
pub use passcheck_model::{NullReporter, Reporter};
