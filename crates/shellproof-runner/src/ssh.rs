//! Session provider over the system `ssh` client
//!
//! Each command runs as one non-interactive `ssh` invocation. Connection
//! parameters are passed as discrete argv elements; the command line itself
//! travels as a single remote argument and is interpreted by the remote
//! login shell, which is the point of a shell command.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tracing::debug;

use crate::session::merge_stderr;
use crate::{RemoteFileSystem, RemoteSession, SessionError};

/// `ssh` exits with 255 when the connection failed, but also when the remote
/// shell exits 255 or dies from a signal.
const SSH_ERROR_STATUS: i32 = 255;

/// What `ssh` itself prints on stderr when it never got a working shell.
const TRANSPORT_FAILURES: &[&str] = &[
    "ssh: connect to host",
    "Could not resolve hostname",
    "Permission denied (",
    "Host key verification failed",
    "Connection closed by",
    "Connection reset by",
    "Connection refused",
    "Connection timed out",
    "kex_exchange_identification",
    "ssh_exchange_identification",
];

fn is_transport_failure(stderr: &str) -> bool {
    TRANSPORT_FAILURES
        .iter()
        .any(|pattern| stderr.contains(pattern))
}

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<Utf8PathBuf>,
    pub connect_timeout: Duration,
}

impl SshTarget {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            port: None,
            identity_file: None,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// `user@host`, or just the host
    #[must_use]
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    /// Options placed before the destination.
    #[must_use]
    pub fn connection_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
        ];
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.to_string());
        }
        args
    }
}

#[derive(Debug, Clone)]
struct SshTransport {
    program: PathBuf,
    target: SshTarget,
}

impl SshTransport {
    fn locate(target: SshTarget) -> Result<Self, SessionError> {
        let program = which::which("ssh").map_err(|e| SessionError::Spawn {
            program: "ssh".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, e.to_string()),
        })?;
        Ok(Self { program, target })
    }

    fn argv(&self, remote_command: &str) -> Vec<String> {
        let mut args = self.target.connection_args();
        args.push(self.target.destination());
        args.push("--".to_string());
        args.push(remote_command.to_string());
        args
    }

    fn exec(&self, remote_command: &str, stdin: Option<&[u8]>) -> Result<Output, SessionError> {
        let spawn_error = |source| SessionError::Spawn {
            program: self.program.display().to_string(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(self.argv(remote_command))
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(bytes) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            pipe.write_all(bytes).map_err(|e| SessionError::Closed {
                reason: format!("writing to ssh stdin failed: {e}"),
            })?;
        }

        let output = child.wait_with_output().map_err(spawn_error)?;

        if output.status.code() == Some(SSH_ERROR_STATUS) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_transport_failure(&stderr) {
                return Err(SessionError::Connection {
                    host: self.target.destination(),
                    reason: stderr.trim().to_string(),
                });
            }
            debug!(
                destination = %self.target.destination(),
                "ssh exited 255 without a connection error; treating it as command output"
            );
        }
        Ok(output)
    }
}

/// A remote shell reached through `ssh`.
#[derive(Debug, Clone)]
pub struct SshSession {
    transport: SshTransport,
    home: Utf8PathBuf,
}

impl SshSession {
    /// Locate `ssh` and settle the remote home directory.
    ///
    /// With `home` unset, the home is asked from the remote side, which also
    /// proves the connection works.
    pub fn connect(target: SshTarget, home: Option<Utf8PathBuf>) -> Result<Self, SessionError> {
        let transport = SshTransport::locate(target)?;
        let home = match home {
            Some(home) => home,
            None => {
                let output = transport.exec(r#"printf %s "$HOME""#, None)?;
                let home = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if home.is_empty() {
                    return Err(SessionError::Closed {
                        reason: format!(
                            "{} reported no home directory",
                            transport.target.destination()
                        ),
                    });
                }
                Utf8PathBuf::from(home)
            }
        };
        debug!(destination = %transport.target.destination(), home = %home, "ssh session ready");
        Ok(Self { transport, home })
    }

    #[must_use]
    pub fn home(&self) -> &Utf8Path {
        &self.home
    }

    /// Filesystem operations over the same connection parameters.
    #[must_use]
    pub fn files(&self) -> SshFileSystem {
        SshFileSystem {
            transport: self.transport.clone(),
            home: self.home.clone(),
        }
    }
}

impl RemoteSession for SshSession {
    fn issue_command(&mut self, command: &str) -> Result<String, SessionError> {
        let remote = merge_stderr(&format!("cd {} && {command}", quote(&self.home)));
        let output = self.transport.exec(&remote, None)?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(combined)
    }

    fn describe(&self) -> String {
        format!("ssh:{}", self.transport.target.destination())
    }
}

/// Remote files read and written with `cat`, `mkdir -p` and `test -e`.
#[derive(Debug, Clone)]
pub struct SshFileSystem {
    transport: SshTransport,
    home: Utf8PathBuf,
}

impl SshFileSystem {
    fn run(&self, remote_command: &str, stdin: Option<&[u8]>) -> io::Result<Output> {
        self.transport
            .exec(remote_command, stdin)
            .map_err(io::Error::other)
    }
}

impl RemoteFileSystem for SshFileSystem {
    fn home(&self) -> &Utf8Path {
        &self.home
    }

    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        let output = self.run(&format!("cat -- {}", quote(&self.resolve(path))), None)?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(remote_io_error(&output))
        }
    }

    fn write(&self, path: &Utf8Path, content: &[u8]) -> io::Result<()> {
        let output = self.run(&format!("cat > {}", quote(&self.resolve(path))), Some(content))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(remote_io_error(&output))
        }
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        let output = self.run(&format!("mkdir -p -- {}", quote(&self.resolve(path))), None)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(remote_io_error(&output))
        }
    }

    fn exists(&self, path: &Utf8Path) -> io::Result<bool> {
        let output = self.run(&format!("test -e {}", quote(&self.resolve(path))), None)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(remote_io_error(&output)),
        }
    }
}

fn quote(path: &Utf8Path) -> String {
    shell_words::quote(path.as_str()).into_owned()
}

fn remote_io_error(output: &Output) -> io::Error {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let kind = if stderr.contains("No such file or directory") {
        io::ErrorKind::NotFound
    } else if stderr.contains("Permission denied") {
        io::ErrorKind::PermissionDenied
    } else {
        io::ErrorKind::Other
    };
    io::Error::new(kind, stderr)
}
