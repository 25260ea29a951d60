//! Filename-suffix labelling.
//!
//! Some datasets encode the sequence type in the file name rather than in a
//! metadata table (`10001_1000001_t2w.mha`, `10001_1000001_adc.mha`). The
//! scanner walks a directory tree, takes the last `separator`-delimited token
//! of each file stem and keeps the files whose suffix has a label.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{IngestError, Result};

pub const FILE_PATH_COLUMN: &str = "file_path";
pub const SUFFIX_COLUMN: &str = "suffix";
pub const LABEL_COLUMN: &str = "label";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// File extension without the leading dot, matched case-insensitively.
    pub extension: String,
    pub separator: char,
    /// Suffix -> label.
    pub suffixes: BTreeMap<String, String>,
}

impl ScanOptions {
    pub fn new(extension: impl Into<String>, suffixes: BTreeMap<String, String>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_string(),
            separator: '_',
            suffixes,
        }
    }

    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }
}

/// Suffix of a file name: the last `separator` token of the text before the
/// final `.`.
///
/// Returns `None` for names without an extension.
pub fn file_suffix(file_name: &str, separator: char) -> Option<&str> {
    let (stem, _) = file_name.rsplit_once('.')?;
    let stem = stem.rsplit('.').next().unwrap_or(stem);
    stem.rsplit(separator).next()
}

/// Walks `root` and returns a frame with `file_path`, `suffix` and `label`
/// columns, one row per labelled file, ordered by path.
pub fn scan_labelled_files(root: &Path, options: &ScanOptions) -> Result<DataFrame> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut paths: Vec<String> = Vec::new();
    let mut suffixes: Vec<String> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| IngestError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), &options.extension) {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(suffix) = file_suffix(name, options.separator) else {
            continue;
        };
        match options.suffixes.get(suffix) {
            Some(label) => {
                paths.push(entry.path().to_string_lossy().into_owned());
                suffixes.push(suffix.to_string());
                labels.push(label.clone());
            }
            None => {
                skipped += 1;
                debug!(suffix, "no label for suffix");
            }
        }
    }

    info!(
        root = %root.display(),
        labelled = paths.len(),
        skipped,
        "scanned files"
    );

    let df = DataFrame::new(vec![
        Column::new(FILE_PATH_COLUMN.into(), paths),
        Column::new(SUFFIX_COLUMN.into(), suffixes),
        Column::new(LABEL_COLUMN.into(), labels),
    ])?;
    Ok(df)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_suffix() {
        assert_eq!(file_suffix("10001_1000001_t2w.mha", '_'), Some("t2w"));
        assert_eq!(file_suffix("case.v2_adc.mha", '_'), Some("adc"));
        assert_eq!(file_suffix("hbv.mha", '_'), Some("hbv"));
        assert_eq!(file_suffix("case-dwi.nii", '-'), Some("dwi"));
        assert_eq!(file_suffix("README", '_'), None);
    }

    #[test]
    fn test_scan_keeps_mapped_suffixes_only() {
        let dir = TempDir::new().unwrap();
        let patient = dir.path().join("10001");
        fs::create_dir_all(&patient).unwrap();
        for name in ["10001_t2w.mha", "10001_adc.mha", "10001_cor.mha", "notes_t2w.txt"] {
            fs::write(patient.join(name), b"").unwrap();
        }

        let suffixes = BTreeMap::from([
            ("t2w".to_string(), "T2".to_string()),
            ("adc".to_string(), "ADC".to_string()),
        ]);
        let df = scan_labelled_files(dir.path(), &ScanOptions::new("mha", suffixes)).unwrap();

        assert_eq!(df.height(), 2);
        let labels: Vec<Option<&str>> = df
            .column(LABEL_COLUMN)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some("ADC"), Some("T2")]);

        let first = df.column(FILE_PATH_COLUMN).unwrap().str().unwrap().get(0).unwrap();
        assert_eq!(
            Path::new(first).strip_prefix(dir.path()).unwrap(),
            Path::new("10001/10001_adc.mha")
        );
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = TempDir::new().unwrap();
        let options = ScanOptions::new(".mha", BTreeMap::new());
        let result = scan_labelled_files(&dir.path().join("missing"), &options);
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }
}
