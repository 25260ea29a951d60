//! Shared utilities for the curation crates.
//!
//! - Polars DataFrame helpers used by ingestion, the record store and output
//! - Redaction of row-level values before they reach the logs

pub mod polars;
pub mod redact;

pub use polars::{any_to_optional_string, any_to_string, column_values, format_numeric, is_missing};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data};
