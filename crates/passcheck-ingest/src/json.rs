use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{IngestError, Result};

/// Read a JSON document into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(|source| {
        IngestError::JsonParse {
            path: path.to_path_buf(),
            source,
        }
    })
}
