//! Local file moves.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use curate_common::redact_value;
use indicatif::ProgressBar;
use tracing::{error, info};

use crate::error::{RelocateError, Result};

/// Creates `root` (and its parents) when missing.
pub fn ensure_root(root: &Path) -> Result<PathBuf> {
    if root.as_os_str().is_empty() {
        return Err(RelocateError::EmptyRoot);
    }
    fs::create_dir_all(root).map_err(|source| RelocateError::CreateRoot {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(root.to_path_buf())
}

/// Moves one file into `root`, keeping its file name.
///
/// Falls back to copy and remove when a rename crosses file systems. An
/// existing destination is never overwritten.
pub fn move_file(source: &Path, root: &Path) -> io::Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let destination = root.join(name);
    if destination.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        ));
    }
    match fs::rename(source, &destination) {
        Ok(()) => Ok(destination),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, &destination)?;
            fs::remove_file(source)?;
            Ok(destination)
        }
        Err(err) => Err(err),
    }
}

/// Moves every file under `root`, creating `root` first.
///
/// The result holds the new path of each input, in input order. Missing
/// inputs and failed moves are `None`.
pub fn move_files_locally(
    files: &[Option<PathBuf>],
    root: &Path,
    progress: &ProgressBar,
) -> Result<Vec<Option<PathBuf>>> {
    let root = ensure_root(root)?;
    progress.set_length(files.len() as u64);

    let mut moved = Vec::with_capacity(files.len());
    let mut failed = 0usize;
    for file in files {
        let outcome = match file {
            Some(path) => match move_file(path, &root) {
                Ok(destination) => Some(destination),
                Err(err) => {
                    failed += 1;
                    error!(
                        file = redact_value(&path.to_string_lossy()),
                        error = %err,
                        "failed to move file"
                    );
                    None
                }
            },
            None => None,
        };
        moved.push(outcome);
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(
        moved = moved.iter().filter(|path| path.is_some()).count(),
        failed,
        "local move finished"
    );
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        path
    }

    #[test]
    fn moves_files_into_fresh_root() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let root = dst.path().join("nested/moved");
        let files = vec![
            Some(touch(src.path(), "a.dcm")),
            Some(touch(src.path(), "b.dcm")),
        ];

        let moved = move_files_locally(&files, &root, &ProgressBar::hidden()).unwrap();

        assert_eq!(moved, vec![Some(root.join("a.dcm")), Some(root.join("b.dcm"))]);
        assert!(root.join("a.dcm").is_file());
        assert!(!src.path().join("a.dcm").exists());
    }

    #[test]
    fn failures_keep_their_position() {
        let src = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let files = vec![
            Some(src.path().join("missing.dcm")),
            None,
            Some(touch(src.path(), "c.dcm")),
        ];

        let moved = move_files_locally(&files, root.path(), &ProgressBar::hidden()).unwrap();

        assert_eq!(moved, vec![None, None, Some(root.path().join("c.dcm"))]);
    }

    #[test]
    fn refuses_to_overwrite() {
        let src = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        touch(root.path(), "a.dcm");
        let source = touch(src.path(), "a.dcm");

        let err = move_file(&source, root.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(source.exists());
    }

    #[test]
    fn empty_root_is_rejected() {
        let result = move_files_locally(&[], Path::new(""), &ProgressBar::hidden());
        assert!(matches!(result, Err(RelocateError::EmptyRoot)));
    }
}
