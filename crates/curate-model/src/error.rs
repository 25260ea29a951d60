use std::path::PathBuf;

use thiserror::Error;

use crate::columns::ColumnRole;

/// Configuration errors. These are fatal and surface before any row is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{role} column name is empty")]
    EmptyColumnName { role: ColumnRole },

    #[error("{role} column '{column}' not found in source")]
    MissingColumn { role: ColumnRole, column: String },

    #[error("column '{column}' is configured for both {first} and {second}")]
    DuplicateColumn {
        column: String,
        first: ColumnRole,
        second: ColumnRole,
    },

    #[error("root path is empty")]
    EmptyRoot,

    #[error("invalid source {path}: {message}")]
    InvalidSource { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
