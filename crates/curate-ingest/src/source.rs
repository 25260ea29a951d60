//! Delimited metadata sources.

use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Reads the header row of a delimited file.
///
/// Fails when the file has no header or a column name is blank.
pub fn read_csv_headers(path: &Path, separator: u8) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(separator)
        .from_path(path)
        .map_err(|source| IngestError::Header {
            path: path.to_path_buf(),
            source,
        })?;
    let record = reader.headers().map_err(|source| IngestError::Header {
        path: path.to_path_buf(),
        source,
    })?;

    if record.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let mut headers = Vec::with_capacity(record.len());
    for (index, name) in record.iter().enumerate() {
        let name = name.trim_start_matches('\u{feff}').trim();
        if name.is_empty() {
            return Err(IngestError::EmptyColumnName {
                index,
                path: path.to_path_buf(),
            });
        }
        headers.push(name.to_string());
    }
    Ok(headers)
}

/// Loads a delimited metadata file into a DataFrame.
///
/// Every column is read as text so identifiers such as series UIDs keep their
/// exact spelling. Empty fields become nulls.
pub fn read_metadata_csv(path: &Path, separator: u8) -> Result<DataFrame> {
    let headers = read_csv_headers(path, separator)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| options.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = headers.len(),
        "loaded metadata"
    );
    Ok(df)
}
