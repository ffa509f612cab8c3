//! Loading of the audit inputs.
//!
//! Requirements tables are read with the `csv` crate, configuration documents
//! with `serde_json` into the typed schemas of `passcheck-model`. The
//! `load_*` entry points never fail: a broken input yields an empty value
//! plus the error, so a run can report it and carry on.

mod error;
mod json;
mod loader;
mod requirements;

pub use error::{IngestError, Result};
pub use json::read_json;
pub use loader::{Loaded, load_document, load_requirements};
pub use requirements::read_requirements;
