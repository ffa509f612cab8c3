use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{error, info};

use passcheck_model::RequirementTable;

use crate::error::IngestError;
use crate::json::read_json;
use crate::requirements::read_requirements;

/// A loaded input: the value, or its empty default plus the load error.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub source: PathBuf,
    pub error: Option<IngestError>,
}

impl<T> Loaded<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Wrap an in-memory value, used by callers that already hold a document.
    pub fn ready(value: T, source: impl Into<PathBuf>) -> Self {
        Self {
            value,
            source: source.into(),
            error: None,
        }
    }
}

fn settle<T: Default>(kind: &str, path: &Path, result: crate::Result<T>) -> Loaded<T> {
    match result {
        Ok(value) => {
            info!(kind, path = %path.display(), "loaded input");
            Loaded::ready(value, path)
        }
        Err(err) => {
            error!(kind, path = %path.display(), error = %err, "failed to load input");
            Loaded {
                value: T::default(),
                source: path.to_path_buf(),
                error: Some(err),
            }
        }
    }
}

pub fn load_requirements(path: &Path) -> Loaded<RequirementTable> {
    settle("requirements", path, read_requirements(path))
}

/// Load a JSON document; `kind` names it in diagnostics ("promo", "actions").
pub fn load_document<T>(kind: &str, path: &Path) -> Loaded<T>
where
    T: DeserializeOwned + Default,
{
    settle(kind, path, read_json(path))
}
