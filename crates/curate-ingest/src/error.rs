//! Error types for metadata ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading metadata.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("metadata file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    // === Parsing Errors ===
    #[error("failed to read header of {path}: {source}")]
    Header {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    #[error("metadata file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    #[error("empty column name at position {index} in {path}")]
    EmptyColumnName { index: usize, path: PathBuf },

    // === DataFrame Errors ===
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
