//! Helpers shared by the feature checklists.

use std::fmt::Display;
use std::hash::Hash;

use passcheck_ingest::Loaded;
use passcheck_model::{Action, ActionsCatalog, PromoDocument, SubjectKey, parse_float};

use crate::index::{Index, scalar_id};
use crate::recorder::Recorder;

/// Turn a load failure into a subject-less error notice.
pub(crate) fn report_load<T>(recorder: &mut Recorder<'_>, kind: &str, loaded: &Loaded<T>) {
    match &loaded.error {
        Some(err) => recorder.error(None, format!("failed to load {kind}: {err}")),
        None => recorder.info(format!("{kind}: {}", loaded.source.display())),
    }
}

/// Warn about rejected and overwritten keys of an index.
pub(crate) fn report_index<K, V>(recorder: &mut Recorder<'_>, what: &str, index: &Index<K, V>)
where
    K: Eq + Hash + Clone + Display + Into<SubjectKey>,
{
    for raw in index.rejected() {
        recorder.warn(None, format!("{what}: ignoring unreadable id '{raw}'"));
    }
    for key in index.duplicates() {
        recorder.warn(
            Some(key.clone().into()),
            format!("{what} {key} appears more than once, the last entry is used"),
        );
    }
}

pub(crate) fn index_actions(catalog: &ActionsCatalog) -> Index<i64, Action> {
    Index::build(catalog.actions().cloned(), |action| {
        scalar_id(action.id.as_ref())
    })
}

/// `seasonPassActions` joined with commas, `None` when not configured.
pub(crate) fn season_pass_actions(promo: &PromoDocument) -> Option<String> {
    promo
        .parameters
        .as_ref()
        .and_then(|parameters| parameters.season_pass_actions.as_ref())
        .filter(|list| !list.0.is_empty())
        .map(|list| list.joined())
}

/// Equality of two written values, numerically when both are numbers.
pub(crate) fn same_value(left: &str, right: &str) -> bool {
    match (parse_float(left), parse_float(right)) {
        (Ok(left), Ok(right)) => (left - right).abs() < f64::EPSILON,
        _ => left.trim() == right.trim(),
    }
}

pub(crate) fn join_ids<T: Display>(ids: impl IntoIterator<Item = T>) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_value_compares_numbers_numerically() {
        assert!(same_value("50", "50.0"));
        assert!(same_value(" 5", "5"));
        assert!(!same_value("5", "6"));
        assert!(same_value("rare", "rare"));
    }
}
