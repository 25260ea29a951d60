//! Metadata ingestion.
//!
//! - **Record sources**: delimited metadata files (one row per image series)
//!   loaded into Polars DataFrames with every column kept as text
//! - **Filename scanning**: label files by the suffix of their file stem
//!   (`case_0012_t2w.mha` -> `t2w`)

mod error;
mod scan;
mod source;

// === Error Types ===
pub use error::{IngestError, Result};

// === Record Sources ===
pub use source::{read_csv_headers, read_metadata_csv};

// === Filename Scanning ===
pub use scan::{
    FILE_PATH_COLUMN, LABEL_COLUMN, SUFFIX_COLUMN, ScanOptions, file_suffix, scan_labelled_files,
};
