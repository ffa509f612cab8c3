//! Cross-validation of a season pass configuration against its requirements.
//!
//! Validators never touch the filesystem: they take loaded documents, build
//! indices, run a fixed table of phases and return a [`Ledger`]. Every entry
//! is also forwarded to a [`Reporter`] as it is recorded.
//!
//! [`Ledger`]: passcheck_model::Ledger
//! [`Reporter`]: passcheck_model::Reporter

pub mod compare;
pub mod extract;
pub mod features;
pub mod index;
pub mod lookup;
pub mod matcher;
pub mod phase;
pub mod recorder;

pub use compare::{CompareMode, Comparison, FLOAT_TOLERANCE, normalize_date, normalize_id_set};
pub use features::Feature;
pub use index::{Grouped, Index, KeyOf};
pub use matcher::{Expect, FieldCheck, Matcher, Observed, Verdict};
pub use phase::{Phase, run_phases};
pub use recorder::Recorder;
