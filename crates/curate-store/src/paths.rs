//! Path column rewrites.

use std::path::{Path, PathBuf};

use curate_model::ConfigError;
use curate_relocate::{CredentialProvider, RemoteTransport, migrate_with, move_files_locally};
use indicatif::ProgressBar;
use polars::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::store::MetadataStore;

impl MetadataStore {
    /// Prefixes every path with `root`. Null paths stay null.
    pub fn add_root_to_path(&mut self, root: &Path) -> Result<()> {
        if root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyRoot.into());
        }
        let rooted: Vec<Option<String>> = self
            .path_values()?
            .into_iter()
            .map(|path| path.map(|path| root.join(path).to_string_lossy().into_owned()))
            .collect();
        self.replace_paths(rooted)?;
        info!(root = %root.display(), "prefixed paths with root");
        Ok(())
    }

    /// Writes `paths` into the path column, one per row.
    pub fn replace_paths(&mut self, paths: Vec<Option<String>>) -> Result<()> {
        self.replace_column(Series::new(self.columns.path.as_str().into(), paths))
    }

    /// Moves every file under `root` and points the path column at the new
    /// locations. Files that could not be moved become null.
    pub fn move_files(&mut self, root: &Path, progress: &ProgressBar) -> Result<usize> {
        let paths = self.path_values()?;
        let moved = move_files_locally(&paths, root, progress)?;
        let failed = count_failed(&paths, &moved);
        self.replace_paths(
            moved
                .into_iter()
                .map(|path| path.map(|path| path.to_string_lossy().into_owned()))
                .collect(),
        )?;
        Ok(failed)
    }

    /// Opens an SSH session, uploads every file to `remote_root` and points
    /// the path column at the remote copies.
    pub fn migrate_files<P>(
        &mut self,
        provider: &mut P,
        remote_root: &str,
        progress: &ProgressBar,
    ) -> Result<usize>
    where
        P: CredentialProvider + ?Sized,
    {
        let paths = self.path_values()?;
        let migrated = curate_relocate::migrate_files(provider, &paths, remote_root, progress)?;
        self.apply_migration(&paths, migrated)
    }

    /// Like [`MetadataStore::migrate_files`], over an already open transport.
    pub fn migrate_files_with<T, P>(
        &mut self,
        transport: &mut T,
        provider: &mut P,
        remote_root: &str,
        progress: &ProgressBar,
    ) -> Result<usize>
    where
        T: RemoteTransport + ?Sized,
        P: CredentialProvider + ?Sized,
    {
        let paths = self.path_values()?;
        let migrated = migrate_with(transport, provider, &paths, remote_root, progress)?;
        self.apply_migration(&paths, migrated)
    }

    fn apply_migration(
        &mut self,
        paths: &[Option<PathBuf>],
        migrated: Vec<Option<String>>,
    ) -> Result<usize> {
        let failed = count_failed(paths, &migrated);
        self.replace_paths(migrated)?;
        Ok(failed)
    }
}

/// Rows that had a path but came back without one.
fn count_failed<T>(before: &[Option<PathBuf>], after: &[Option<T>]) -> usize {
    before
        .iter()
        .zip(after)
        .filter(|(old, new)| old.is_some() && new.is_none())
        .count()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use curate_model::ColumnConfig;
    use tempfile::TempDir;

    use crate::error::StoreError;
    use crate::store::tests::sample_store;

    use super::*;

    #[test]
    fn add_root_prefixes_relative_paths() {
        let df = DataFrame::new(vec![
            Column::new("path".into(), [Some("./P-0001/t2"), None]),
            Column::new("label".into(), ["T2", "ADC"]),
        ])
        .unwrap();
        let mut store = MetadataStore::from_frame(df, ColumnConfig::new("path", "label")).unwrap();

        store.add_root_to_path(Path::new("/data/prostate")).unwrap();

        let paths = store.path_values().unwrap();
        assert_eq!(paths[0].as_deref(), Some(Path::new("/data/prostate/./P-0001/t2")));
        assert_eq!(paths[1], None);
    }

    #[test]
    fn empty_root_is_a_configuration_error() {
        let mut store = sample_store();
        let err = store.add_root_to_path(Path::new("")).unwrap_err();
        assert!(matches!(err, StoreError::Config(ConfigError::EmptyRoot)));
    }

    #[test]
    fn move_files_rewrites_path_column() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let existing = src.path().join("1.dcm");
        fs::write(&existing, b"dicom").unwrap();
        let df = DataFrame::new(vec![
            Column::new(
                "path".into(),
                [
                    existing.to_string_lossy().into_owned(),
                    src.path().join("gone.dcm").to_string_lossy().into_owned(),
                ],
            ),
            Column::new("label".into(), ["T2", "ADC"]),
        ])
        .unwrap();
        let mut store = MetadataStore::from_frame(df, ColumnConfig::new("path", "label")).unwrap();

        let failed = store
            .move_files(&dst.path().join("chosen"), &ProgressBar::hidden())
            .unwrap();

        assert_eq!(failed, 1);
        let paths = store.path_values().unwrap();
        assert_eq!(paths[0], Some(dst.path().join("chosen").join("1.dcm")));
        assert_eq!(paths[1], None);
        assert_eq!(store.source().column("path").unwrap().null_count(), 0);
    }
}
