//! Plain line-list writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{OutputError, Result, ensure_parent};

/// Writes one value per line without a header.
pub fn write_lines<S: AsRef<str>>(path: &Path, values: &[S]) -> Result<PathBuf> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for value in values {
        writeln!(writer, "{}", value.as_ref()).map_err(|e| OutputError::io(path, e))?;
    }
    writer.flush().map_err(|e| OutputError::io(path, e))?;
    Ok(path.to_path_buf())
}
