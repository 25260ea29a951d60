//! JSON writer with 4-space indentation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;

use crate::error::{OutputError, Result, ensure_parent};

/// Serializes `value` to `path` using 4-space indentation.
pub fn write_json_indented<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|source| OutputError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(|e| OutputError::io(path, e))?;
    Ok(path.to_path_buf())
}
