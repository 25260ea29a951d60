//! Error types for label mapping.

use std::path::PathBuf;

use curate_output::OutputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("dictionary directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON map {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write diagnostics: {0}")]
    Diagnostics(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, MapError>;
