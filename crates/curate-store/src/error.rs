//! Error types for the record store.

use curate_ingest::IngestError;
use curate_map::MapError;
use curate_model::ConfigError;
use curate_output::OutputError;
use curate_relocate::RelocateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Relocate(#[from] RelocateError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("column '{column}' not found in processed metadata")]
    ColumnNotFound { column: String },

    #[error("expected {expected} values for column '{column}', got {actual}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl StoreError {
    /// True when the user declined to create the remote directory.
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Relocate(err) if err.is_declined())
    }
}

impl From<polars::prelude::PolarsError> for StoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
