use std::fs;
use std::path::{Path, PathBuf};

use curate_relocate::{
    CredentialProvider, RelocateError, RemoteTransport, StaticCredentials, migrate_with,
    move_files_locally,
};
use indicatif::ProgressBar;
use tempfile::TempDir;

#[test]
fn local_move_returns_one_path_per_file_under_fresh_root() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let root = dst.path().join("moved_files");
    let files: Vec<Option<PathBuf>> = (0..5)
        .map(|i| {
            let path = src.path().join(format!("IM-{i:04}.dcm"));
            fs::write(&path, [0u8; 16]).unwrap();
            Some(path)
        })
        .collect();

    let moved = move_files_locally(&files, &root, &ProgressBar::hidden()).unwrap();

    assert!(root.is_dir());
    assert_eq!(moved.len(), files.len());
    for path in moved {
        let path = path.unwrap();
        assert!(path.starts_with(&root));
        assert!(path.is_file());
    }
}

/// Transport that copies into a local directory standing in for the remote.
struct DirectoryTransport {
    base: PathBuf,
}

impl DirectoryTransport {
    fn local(&self, remote: &str) -> PathBuf {
        self.base.join(remote.trim_start_matches('/'))
    }
}

impl RemoteTransport for DirectoryTransport {
    fn dir_exists(&mut self, dir: &str) -> curate_relocate::Result<bool> {
        Ok(self.local(dir).is_dir())
    }

    fn create_dir(&mut self, dir: &str) -> curate_relocate::Result<()> {
        fs::create_dir_all(self.local(dir)).map_err(|source| RelocateError::Transfer { source })
    }

    fn upload(&mut self, local: &Path, remote_path: &str) -> curate_relocate::Result<()> {
        fs::copy(local, self.local(remote_path))
            .map(|_| ())
            .map_err(|source| RelocateError::Transfer { source })
    }
}

#[test]
fn migration_creates_confirmed_root_and_keeps_sources() {
    let src = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    let file = src.path().join("10001_t2w.mha");
    fs::write(&file, b"volume").unwrap();

    let mut transport = DirectoryTransport {
        base: remote.path().to_path_buf(),
    };
    let mut provider =
        StaticCredentials::new("gpu01", "researcher", "secret").with_create_missing_dir(true);
    assert_eq!(provider.hostname().unwrap(), "gpu01");

    let migrated = migrate_with(
        &mut transport,
        &mut provider,
        &[Some(file.clone()), Some(src.path().join("missing.mha"))],
        "/datasets/picai",
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert_eq!(
        migrated,
        vec![Some("/datasets/picai/10001_t2w.mha".to_string()), None]
    );
    assert!(remote.path().join("datasets/picai/10001_t2w.mha").is_file());
    assert!(file.exists());
}
