use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use curate_common::column_values;
use curate_ingest::read_metadata_csv;
use curate_model::{ColumnConfig, ConfigError};
use curate_output::{DelimitedOptions, write_delimited};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Source and processed views of one metadata table.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    source: DataFrame,
    pub(crate) processed: DataFrame,
    source_columns: ColumnConfig,
    pub(crate) columns: ColumnConfig,
}

impl MetadataStore {
    /// Builds a store over an in-memory table.
    pub fn from_frame(source: DataFrame, columns: ColumnConfig) -> Result<Self> {
        let headers = frame_headers(&source);
        columns.validate(&headers)?;
        info!(
            rows = source.height(),
            columns = source.width(),
            path_column = %columns.path,
            label_column = %columns.label,
            "metadata store ready"
        );
        Ok(Self {
            processed: source.clone(),
            source,
            source_columns: columns.clone(),
            columns,
        })
    }

    /// Loads a delimited file and builds a store over it.
    pub fn from_csv(path: &Path, separator: u8, columns: ColumnConfig) -> Result<Self> {
        let source = read_metadata_csv(path, separator).map_err(|err| ConfigError::InvalidSource {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_frame(source, columns)
    }

    pub fn source(&self) -> &DataFrame {
        &self.source
    }

    pub fn processed(&self) -> &DataFrame {
        &self.processed
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.processed.height()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.height() == 0
    }

    /// Resets the processed view (and any column renames) to the source.
    pub fn revert_to_original(&mut self) -> &DataFrame {
        self.processed = self.source.clone();
        self.columns = self.source_columns.clone();
        debug!(rows = self.processed.height(), "reverted to source metadata");
        &self.processed
    }

    /// Keeps only `names`, in the given order.
    pub fn keep_columns(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            self.require_column(name)?;
        }
        self.processed = self.processed.select(names.iter().map(String::as_str))?;
        Ok(())
    }

    /// Renames columns of the processed view (`old -> new`).
    ///
    /// Configured roles follow their column.
    pub fn rename_columns(&mut self, renames: &BTreeMap<String, String>) -> Result<()> {
        for old in renames.keys() {
            self.require_column(old)?;
        }
        for (old, new) in renames {
            self.processed.rename(old, new.as_str().into())?;
            self.columns.apply_rename(old, new);
        }
        Ok(())
    }

    /// A copy of the processed view restricted to `names`.
    pub fn view_columns(&self, names: &[String]) -> Result<DataFrame> {
        for name in names {
            self.require_column(name)?;
        }
        Ok(self.processed.select(names.iter().map(String::as_str))?)
    }

    /// Path column of the processed view, nulls as `None`.
    pub fn path_values(&self) -> Result<Vec<Option<PathBuf>>> {
        Ok(self
            .column_text(&self.columns.path)?
            .into_iter()
            .map(|value| value.map(PathBuf::from))
            .collect())
    }

    /// Label column of the processed view, nulls as `None`.
    pub fn label_values(&self) -> Result<Vec<Option<String>>> {
        self.column_text(&self.columns.label)
    }

    /// Writes the processed view as a delimited file.
    pub fn write(&self, path: &Path, options: &DelimitedOptions) -> Result<PathBuf> {
        Ok(write_delimited(&self.processed, path, options)?)
    }

    pub(crate) fn require_column(&self, name: &str) -> Result<()> {
        if self.processed.get_column_index(name).is_none() {
            return Err(StoreError::ColumnNotFound {
                column: name.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn column_text(&self, name: &str) -> Result<Vec<Option<String>>> {
        self.require_column(name)?;
        Ok(column_values(&self.processed, name)?)
    }

    /// Replaces a column of the processed view, keeping its position.
    pub(crate) fn replace_column(&mut self, series: Series) -> Result<()> {
        if series.len() != self.processed.height() {
            return Err(StoreError::LengthMismatch {
                column: series.name().to_string(),
                expected: self.processed.height(),
                actual: series.len(),
            });
        }
        self.processed.with_column(series)?;
        Ok(())
    }

    /// Keeps the rows whose flag is set.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) -> Result<usize> {
        let before = self.processed.height();
        let mask = BooleanChunked::from_slice("keep".into(), keep);
        self.processed = self.processed.filter(&mask)?;
        Ok(before - self.processed.height())
    }
}

fn frame_headers(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}
