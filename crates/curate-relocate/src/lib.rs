//! File relocation for curated datasets.
//!
//! Files can be moved under a local root or copied over SCP to a remote host.
//! Both routes return one entry per input file, in input order, with `None`
//! for files that could not be relocated. A failed file never aborts the
//! batch; only setup failures (root creation, connection, declined remote
//! directory) are errors.
//!
//! Interactive input and the remote session sit behind traits
//! ([`CredentialProvider`], [`RemoteTransport`]) so the batch logic can run
//! against in-memory doubles.

mod credentials;
mod error;
mod local;
mod migrate;
mod ssh;

// === Error Types ===
pub use error::{RelocateError, Result};

// === Credentials ===
pub use credentials::{
    CredentialProvider, InteractiveCredentials, REMOTE_HOSTNAME_VAR, StaticCredentials,
};

// === Local Moves ===
pub use local::{ensure_root, move_file, move_files_locally};

// === Remote Migration ===
pub use migrate::{RemoteTransport, ensure_remote_dir, migrate_files, migrate_with, remote_join};
pub use ssh::{DEFAULT_SSH_PORT, SshSession};
