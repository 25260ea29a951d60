//! Remote migration batches.

use std::path::{Path, PathBuf};

use curate_common::redact_value;
use indicatif::ProgressBar;
use tracing::{error, info};

use crate::credentials::CredentialProvider;
use crate::error::{RelocateError, Result};
use crate::ssh::SshSession;

/// Operations a migration needs from a remote session.
pub trait RemoteTransport {
    fn dir_exists(&mut self, dir: &str) -> Result<bool>;
    /// Creates `dir` and its parents.
    fn create_dir(&mut self, dir: &str) -> Result<()>;
    /// Copies `local` to `remote_path`.
    fn upload(&mut self, local: &Path, remote_path: &str) -> Result<()>;
}

/// Joins a POSIX remote directory and a file name.
pub fn remote_join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Makes sure `dir` exists on the remote, asking before creating it.
pub fn ensure_remote_dir<T, P>(transport: &mut T, provider: &mut P, dir: &str) -> Result<()>
where
    T: RemoteTransport + ?Sized,
    P: CredentialProvider + ?Sized,
{
    if transport.dir_exists(dir)? {
        return Ok(());
    }
    if !provider.confirm_create_dir(dir)? {
        return Err(RelocateError::RemoteDirDeclined {
            path: dir.to_string(),
        });
    }
    transport.create_dir(dir)?;
    info!(dir, "created remote directory");
    Ok(())
}

/// Opens an SSH session through `provider` and uploads every file.
///
/// The session is closed when the batch ends, whatever the per-file outcome.
pub fn migrate_files<P>(
    provider: &mut P,
    files: &[Option<PathBuf>],
    remote_root: &str,
    progress: &ProgressBar,
) -> Result<Vec<Option<String>>>
where
    P: CredentialProvider + ?Sized,
{
    let mut session = SshSession::connect(provider)?;
    migrate_with(&mut session, provider, files, remote_root, progress)
}

/// Uploads every file to `remote_root` over an already open transport.
///
/// Returns the remote path of each input in input order; missing inputs and
/// failed uploads are `None`.
pub fn migrate_with<T, P>(
    transport: &mut T,
    provider: &mut P,
    files: &[Option<PathBuf>],
    remote_root: &str,
    progress: &ProgressBar,
) -> Result<Vec<Option<String>>>
where
    T: RemoteTransport + ?Sized,
    P: CredentialProvider + ?Sized,
{
    if remote_root.trim().is_empty() {
        return Err(RelocateError::EmptyRoot);
    }
    ensure_remote_dir(transport, provider, remote_root)?;
    progress.set_length(files.len() as u64);

    let mut migrated = Vec::with_capacity(files.len());
    let mut failed = 0usize;
    for file in files {
        let outcome = match file {
            Some(path) => match upload_one(transport, path, remote_root) {
                Ok(remote) => Some(remote),
                Err(err) => {
                    failed += 1;
                    error!(
                        file = redact_value(&path.to_string_lossy()),
                        error = %err,
                        "failed to migrate file"
                    );
                    None
                }
            },
            None => None,
        };
        migrated.push(outcome);
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(
        migrated = migrated.iter().filter(|path| path.is_some()).count(),
        failed,
        "remote migration finished"
    );
    Ok(migrated)
}

fn upload_one<T>(transport: &mut T, local: &Path, remote_root: &str) -> Result<String>
where
    T: RemoteTransport + ?Sized,
{
    let name = local
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(RelocateError::NoFileName)?;
    let remote = remote_join(remote_root, name);
    transport.upload(local, &remote)?;
    Ok(remote)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::credentials::StaticCredentials;

    use super::*;

    #[derive(Default)]
    struct MemoryTransport {
        dirs: BTreeSet<String>,
        uploads: Vec<(PathBuf, String)>,
        failing: BTreeSet<PathBuf>,
    }

    impl RemoteTransport for MemoryTransport {
        fn dir_exists(&mut self, dir: &str) -> Result<bool> {
            Ok(self.dirs.contains(dir))
        }

        fn create_dir(&mut self, dir: &str) -> Result<()> {
            self.dirs.insert(dir.to_string());
            Ok(())
        }

        fn upload(&mut self, local: &Path, remote_path: &str) -> Result<()> {
            if self.failing.contains(local) {
                return Err(RelocateError::Transfer {
                    source: std::io::Error::other("connection reset"),
                });
            }
            self.uploads.push((local.to_path_buf(), remote_path.to_string()));
            Ok(())
        }
    }

    #[test]
    fn remote_join_handles_slashes() {
        assert_eq!(remote_join("/srv/data/", "a.dcm"), "/srv/data/a.dcm");
        assert_eq!(remote_join("data", "a.dcm"), "data/a.dcm");
        assert_eq!(remote_join("/", "a.dcm"), "/a.dcm");
    }

    #[test]
    fn uploads_in_order_and_records_failures() {
        let mut transport = MemoryTransport::default();
        transport.dirs.insert("/srv/data".to_string());
        transport.failing.insert(PathBuf::from("/local/b.dcm"));
        let mut provider = StaticCredentials::new("host", "user", "secret");
        let files = vec![
            Some(PathBuf::from("/local/a.dcm")),
            Some(PathBuf::from("/local/b.dcm")),
            None,
            Some(PathBuf::from("/local/c.dcm")),
        ];

        let migrated = migrate_with(
            &mut transport,
            &mut provider,
            &files,
            "/srv/data",
            &ProgressBar::hidden(),
        )
        .unwrap();

        assert_eq!(
            migrated,
            vec![
                Some("/srv/data/a.dcm".to_string()),
                None,
                None,
                Some("/srv/data/c.dcm".to_string()),
            ]
        );
        assert_eq!(transport.uploads.len(), 2);
        assert!(provider.confirmations.is_empty());
    }

    #[test]
    fn missing_dir_is_created_after_confirmation() {
        let mut transport = MemoryTransport::default();
        let mut provider =
            StaticCredentials::new("host", "user", "secret").with_create_missing_dir(true);

        ensure_remote_dir(&mut transport, &mut provider, "/srv/new").unwrap();

        assert!(transport.dirs.contains("/srv/new"));
        assert_eq!(provider.confirmations, vec!["/srv/new".to_string()]);
    }

    #[test]
    fn declining_aborts_before_any_upload() {
        let mut transport = MemoryTransport::default();
        let mut provider = StaticCredentials::new("host", "user", "secret");
        let files = vec![Some(PathBuf::from("/local/a.dcm"))];

        let err = migrate_with(
            &mut transport,
            &mut provider,
            &files,
            "/srv/new",
            &ProgressBar::hidden(),
        )
        .unwrap_err();

        assert!(err.is_declined());
        assert!(transport.uploads.is_empty());
        assert!(transport.dirs.is_empty());
    }
}
