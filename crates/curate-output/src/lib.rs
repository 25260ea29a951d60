//! Artifact writers for curated metadata.
//!
//! - **Delimited tables**: processed metadata with a configurable column subset,
//!   separator, header row and row index
//! - **Label lists**: one value per line, no header
//! - **JSON maps**: objects written with 4-space indentation

mod delimited;
mod error;
mod json;
mod lines;

pub use delimited::{DelimitedOptions, INDEX_COLUMN, parse_separator, write_delimited};
pub use error::{OutputError, Result};
pub use json::write_json_indented;
pub use lines::write_lines;
