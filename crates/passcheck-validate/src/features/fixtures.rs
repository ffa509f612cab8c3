//! Builders for feature tests.

use passcheck_ingest::Loaded;
use passcheck_model::{RequirementRow, RequirementTable};
use serde::de::DeserializeOwned;

/// A requirements table from `(column, value)` rows; lines start at 2.
pub(crate) fn table(rows: &[&[(&str, &str)]]) -> Loaded<RequirementTable> {
    let rows: Vec<RequirementRow> = rows
        .iter()
        .enumerate()
        .map(|(idx, cells)| {
            RequirementRow::new(
                idx + 2,
                cells
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            )
        })
        .collect();
    let headers = rows
        .first()
        .map(|row| row.columns().map(|(name, _)| name.to_string()).collect())
        .unwrap_or_default();
    Loaded::ready(RequirementTable { headers, rows }, "requirements.csv")
}

pub(crate) fn json<T: DeserializeOwned>(text: &str, name: &str) -> Loaded<T> {
    Loaded::ready(serde_json::from_str(text).expect("parse fixture"), name)
}
