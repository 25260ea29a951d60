//! Credential sources for remote migration.

use std::env;
use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use crate::error::{RelocateError, Result};

/// Environment variable (or `.env` entry) holding the remote host name.
pub const REMOTE_HOSTNAME_VAR: &str = "REMOTE_HOSTNAME";

/// Supplies connection details and answers confirmation questions.
pub trait CredentialProvider {
    fn hostname(&mut self) -> Result<String>;
    fn username(&mut self) -> Result<String>;
    fn password(&mut self) -> Result<String>;
    /// Asks whether a missing remote directory may be created.
    fn confirm_create_dir(&mut self, dir: &str) -> Result<bool>;
}

/// Terminal-backed provider.
///
/// The host name comes from `REMOTE_HOSTNAME` (process environment, then a
/// `.env` file in the working directory) and is prompted for otherwise. User
/// name and password are always prompted; the password is read without echo.
#[derive(Debug, Default)]
pub struct InteractiveCredentials;

impl InteractiveCredentials {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialProvider for InteractiveCredentials {
    fn hostname(&mut self) -> Result<String> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env file");
        }
        let hostname = match env::var(REMOTE_HOSTNAME_VAR) {
            Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => {
                info!("no {REMOTE_HOSTNAME_VAR} configured");
                prompt_line("hostname", "Enter the hostname of the remote server: ")?
            }
        };
        info!(host = %hostname, "connecting to remote");
        Ok(hostname)
    }

    fn username(&mut self) -> Result<String> {
        prompt_line("username", "Username: ")
    }

    fn password(&mut self) -> Result<String> {
        rpassword::prompt_password("Password: ").map_err(|source| RelocateError::Prompt {
            field: "password",
            source,
        })
    }

    fn confirm_create_dir(&mut self, dir: &str) -> Result<bool> {
        let answer = prompt_line(
            "confirmation",
            &format!("Remote dir does not exist. Create\n {dir}? (y/n): "),
        )?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }
}

fn prompt_line(field: &'static str, prompt: &str) -> Result<String> {
    let to_prompt_error = |source| RelocateError::Prompt { field, source };
    let mut stderr = io::stderr().lock();
    stderr.write_all(prompt.as_bytes()).map_err(to_prompt_error)?;
    stderr.flush().map_err(to_prompt_error)?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(to_prompt_error)?;
    Ok(line.trim().to_string())
}

/// Fixed answers, for scripted runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub create_missing_dir: bool,
    /// Directories the provider was asked to confirm.
    pub confirmations: Vec<String>,
}

impl StaticCredentials {
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_create_missing_dir(mut self, create: bool) -> Self {
        self.create_missing_dir = create;
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn hostname(&mut self) -> Result<String> {
        Ok(self.hostname.clone())
    }

    fn username(&mut self) -> Result<String> {
        Ok(self.username.clone())
    }

    fn password(&mut self) -> Result<String> {
        Ok(self.password.clone())
    }

    fn confirm_create_dir(&mut self, dir: &str) -> Result<bool> {
        self.confirmations.push(dir.to_string());
        Ok(self.create_missing_dir)
    }
}
