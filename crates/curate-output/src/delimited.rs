//! Delimited (CSV/TSV) table writer.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::debug;

use crate::error::{OutputError, Result, ensure_parent};

/// Name of the row index column when `include_index` is set.
pub const INDEX_COLUMN: &str = "index";

/// Options for writing a metadata table.
///
/// Defaults follow the downstream training pipeline's label files: comma
/// separated, no header, no row index, every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedOptions {
    /// Columns to write, in order. `None` writes every column.
    pub columns: Option<Vec<String>>,
    /// Field separator byte.
    pub separator: u8,
    /// Write the header row.
    pub include_header: bool,
    /// Prepend a zero-based row index column.
    pub include_index: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            columns: None,
            separator: b',',
            include_header: false,
            include_index: false,
        }
    }
}

impl DelimitedOptions {
    #[must_use]
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    #[must_use]
    pub fn with_header(mut self, enable: bool) -> Self {
        self.include_header = enable;
        self
    }

    #[must_use]
    pub fn with_index(mut self, enable: bool) -> Self {
        self.include_index = enable;
        self
    }
}

/// Parses a separator given on the command line.
///
/// Accepts a single ASCII character, `tab` or the two-character escape `\t`.
pub fn parse_separator(value: &str) -> Result<u8> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        other => {
            let bytes = other.as_bytes();
            if bytes.len() == 1 && bytes[0].is_ascii() {
                Ok(bytes[0])
            } else {
                Err(OutputError::InvalidSeparator {
                    value: other.to_string(),
                })
            }
        }
    }
}

/// Writes a table to `path` according to `options` and returns the path.
///
/// The input frame is not modified.
pub fn write_delimited(df: &DataFrame, path: &Path, options: &DelimitedOptions) -> Result<PathBuf> {
    let mut table = match &options.columns {
        Some(columns) => {
            for column in columns {
                if df.column(column).is_err() {
                    return Err(OutputError::ColumnNotFound {
                        column: column.clone(),
                    });
                }
            }
            df.select(columns.iter().map(String::as_str))
                .map_err(|e| table_error(path, &e))?
        }
        None => df.clone(),
    };
    if options.include_index {
        table = table
            .with_row_index(INDEX_COLUMN.into(), None)
            .map_err(|e| table_error(path, &e))?;
    }

    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    CsvWriter::new(&mut writer)
        .include_header(options.include_header)
        .with_separator(options.separator)
        .finish(&mut table)
        .map_err(|e| table_error(path, &e))?;

    debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "wrote delimited table"
    );
    Ok(path.to_path_buf())
}

fn table_error(path: &Path, error: &polars::prelude::PolarsError) -> OutputError {
    OutputError::Table {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};
    use tempfile::TempDir;

    use super::*;

    fn sample() -> DataFrame {
        let cols: Vec<Column> = vec![
            Series::new("path".into(), &["/a/1.dcm", "/a/2.dcm"]).into_column(),
            Series::new("label".into(), &["T2", "ADC"]).into_column(),
        ];
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn parse_separator_variants() {
        assert_eq!(parse_separator(",").unwrap(), b',');
        assert_eq!(parse_separator("tab").unwrap(), b'\t');
        assert_eq!(parse_separator("\\t").unwrap(), b'\t');
        assert!(parse_separator(";;").is_err());
        assert!(parse_separator("").is_err());
    }

    #[test]
    fn writes_tsv_without_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.tsv");
        let options = DelimitedOptions::default().with_separator(b'\t');
        write_delimited(&sample(), &path, &options).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "/a/1.dcm\tT2\n/a/2.dcm\tADC\n");
    }

    #[test]
    fn writes_header_and_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let options = DelimitedOptions::default()
            .with_header(true)
            .with_index(true)
            .with_columns(vec!["label".to_string()]);
        write_delimited(&sample(), &path, &options).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "index,label\n0,T2\n1,ADC\n");
    }

    #[test]
    fn unknown_column_is_rejected() {
        let dir = TempDir::new().unwrap();
        let options = DelimitedOptions::default().with_columns(vec!["missing".to_string()]);
        let err = write_delimited(&sample(), &dir.path().join("x.csv"), &options).unwrap_err();
        assert!(matches!(err, OutputError::ColumnNotFound { .. }));
    }

    #[test]
    fn creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_delimited(&sample(), &path, &DelimitedOptions::default()).unwrap();
        assert!(path.exists());
    }
}
