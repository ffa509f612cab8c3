//! CLI library components for the season pass auditor.

pub mod logging;
