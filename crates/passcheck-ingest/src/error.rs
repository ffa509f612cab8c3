//! Error types for input loading.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// File missing or unreadable.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    pub fn path(&self) -> &PathBuf {
        match self {
            IngestError::FileRead { path, .. }
            | IngestError::CsvParse { path, .. }
            | IngestError::JsonParse { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
