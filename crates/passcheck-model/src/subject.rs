use std::fmt;

use serde::Serialize;

/// The identifier check results are grouped under.
///
/// Action-keyed features use [`SubjectKey::Id`]; reminders and RFM offers
/// key their rows by a free-form alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum SubjectKey {
    Id(i64),
    Alias(String),
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectKey::Id(id) => write!(f, "{id}"),
            SubjectKey::Alias(alias) => f.write_str(alias),
        }
    }
}

impl From<i64> for SubjectKey {
    fn from(id: i64) -> Self {
        SubjectKey::Id(id)
    }
}

impl From<&str> for SubjectKey {
    fn from(alias: &str) -> Self {
        SubjectKey::Alias(alias.to_string())
    }
}

impl From<String> for SubjectKey {
    fn from(alias: String) -> Self {
        SubjectKey::Alias(alias)
    }
}
