//! Error types for file relocation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelocateError {
    // === Setup Errors ===
    #[error("target root must not be empty")]
    EmptyRoot,

    #[error("failed to create target root {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {field} from the terminal: {source}")]
    Prompt {
        field: &'static str,
        #[source]
        source: std::io::Error,
    },

    // === Session Errors ===
    #[error("failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("SSH session with {host} failed: {source}")]
    Session {
        host: String,
        #[source]
        source: ssh2::Error,
    },

    #[error("host key of {host} rejected: {reason}")]
    HostKey { host: String, reason: String },

    #[error("authentication as {user} on {host} failed")]
    Auth { host: String, user: String },

    #[error("remote command `{command}` failed: {message}")]
    RemoteCommand { command: String, message: String },

    #[error("creation of remote directory {path} declined")]
    RemoteDirDeclined { path: String },

    // === Per-file Errors ===
    #[error("file has no name")]
    NoFileName,

    #[error("file transfer failed: {source}")]
    Transfer {
        #[source]
        source: std::io::Error,
    },
}

impl RelocateError {
    /// True for errors raised by the user declining an action.
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::RemoteDirDeclined { .. })
    }
}

pub type Result<T> = std::result::Result<T, RelocateError>;
