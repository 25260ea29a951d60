//! SSH transport backed by libssh2.

use std::env;
use std::fs::File;
use std::io::{self, Read};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use ssh2::{CheckResult, KnownHostFileKind, Session};
use tracing::{debug, info, warn};

use crate::credentials::CredentialProvider;
use crate::error::{RelocateError, Result};
use crate::migrate::RemoteTransport;

pub const DEFAULT_SSH_PORT: u16 = 22;

const UPLOAD_MODE: i32 = 0o644;

/// An authenticated SSH session.
///
/// Hosts missing from `~/.ssh/known_hosts` are rejected. The session is
/// disconnected on drop.
pub struct SshSession {
    host: String,
    session: Session,
}

impl SshSession {
    /// Connects and authenticates with the details supplied by `provider`.
    ///
    /// `host:port` selects a non-default port.
    pub fn connect<P>(provider: &mut P) -> Result<Self>
    where
        P: CredentialProvider + ?Sized,
    {
        let target = provider.hostname()?;
        let (host, port) = split_host_port(&target);
        let host = host.to_string();

        let tcp = TcpStream::connect((host.as_str(), port)).map_err(|source| {
            RelocateError::Connect {
                host: host.clone(),
                source,
            }
        })?;
        let session_error = |source| RelocateError::Session {
            host: host.clone(),
            source,
        };
        let mut session = Session::new().map_err(session_error)?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(session_error)?;
        verify_host_key(&session, &host, port)?;

        let user = provider.username()?;
        let password = provider.password()?;
        if let Err(err) = session.userauth_password(&user, &password) {
            debug!(error = %err, "password authentication rejected");
        }
        if !session.authenticated() {
            return Err(RelocateError::Auth { host, user });
        }

        info!(host = %host, "connected to remote");
        Ok(Self { host, session })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Runs `command` and returns its exit status and standard error.
    fn exec(&self, command: &str) -> Result<(i32, String)> {
        let command_error = |err: ssh2::Error| RelocateError::RemoteCommand {
            command: command.to_string(),
            message: err.to_string(),
        };
        let mut channel = self.session.channel_session().map_err(command_error)?;
        channel.exec(command).map_err(command_error)?;

        let mut stdout = String::new();
        let mut stderr = String::new();
        let read = channel
            .read_to_string(&mut stdout)
            .and_then(|_| channel.stderr().read_to_string(&mut stderr));
        if let Err(err) = read {
            return Err(RelocateError::RemoteCommand {
                command: command.to_string(),
                message: err.to_string(),
            });
        }
        channel.wait_close().map_err(command_error)?;
        let status = channel.exit_status().map_err(command_error)?;
        Ok((status, stderr))
    }
}

impl RemoteTransport for SshSession {
    fn dir_exists(&mut self, dir: &str) -> Result<bool> {
        let (status, _) = self.exec(&format!("test -d {}", shell_quote(dir)))?;
        Ok(status == 0)
    }

    fn create_dir(&mut self, dir: &str) -> Result<()> {
        let command = format!("mkdir -p {}", shell_quote(dir));
        let (status, stderr) = self.exec(&command)?;
        if status != 0 || !stderr.trim().is_empty() {
            return Err(RelocateError::RemoteCommand {
                command,
                message: stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    fn upload(&mut self, local: &Path, remote_path: &str) -> Result<()> {
        send_file(&self.session, local, remote_path)
            .map_err(|source| RelocateError::Transfer { source })
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if let Err(err) = self.session.disconnect(None, "migration finished", None) {
            warn!(host = %self.host, error = %err, "failed to close SSH session");
        } else {
            info!(host = %self.host, "disconnected from remote");
        }
    }
}

fn send_file(session: &Session, local: &Path, remote_path: &str) -> io::Result<()> {
    let mut file = File::open(local)?;
    let size = file.metadata()?.len();
    let mut channel = session.scp_send(Path::new(remote_path), UPLOAD_MODE, size, None)?;
    io::copy(&mut file, &mut channel)?;
    channel.send_eof()?;
    channel.wait_eof()?;
    channel.close()?;
    channel.wait_close()?;
    Ok(())
}

fn verify_host_key(session: &Session, host: &str, port: u16) -> Result<()> {
    let reject = |reason: String| RelocateError::HostKey {
        host: host.to_string(),
        reason,
    };
    let known_hosts_path = known_hosts_file()
        .ok_or_else(|| reject("no home directory to locate known_hosts".to_string()))?;

    let mut known_hosts = session.known_hosts().map_err(|e| reject(e.to_string()))?;
    known_hosts
        .read_file(&known_hosts_path, KnownHostFileKind::OpenSSH)
        .map_err(|e| reject(format!("{}: {e}", known_hosts_path.display())))?;
    let (key, _) = session
        .host_key()
        .ok_or_else(|| reject("server sent no host key".to_string()))?;

    match known_hosts.check_port(host, port, key) {
        CheckResult::Match => Ok(()),
        CheckResult::NotFound => Err(reject("host is not in known_hosts".to_string())),
        CheckResult::Mismatch => Err(reject("host key does not match known_hosts".to_string())),
        CheckResult::Failure => Err(reject("host key check failed".to_string())),
    }
}

fn known_hosts_file() -> Option<PathBuf> {
    let home = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE"))?;
    Some(PathBuf::from(home).join(".ssh").join("known_hosts"))
}

fn split_host_port(target: &str) -> (&str, u16) {
    match target.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (host, port),
            Err(_) => (target, DEFAULT_SSH_PORT),
        },
        _ => (target, DEFAULT_SSH_PORT),
    }
}

/// Quotes `value` for a POSIX shell.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
