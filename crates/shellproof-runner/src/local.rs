//! Session provider for the local machine
//!
//! Useful for running the same command specs against a workstation or a CI
//! runner without an ssh hop. The working directory plays the role of the
//! remote home directory.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use std::process::Command;
use tracing::debug;

use crate::session::merge_stderr;
use crate::{RemoteFileSystem, RemoteSession, SessionError};

/// Runs each command line with `<shell> -c` in a fixed directory.
///
/// stderr is redirected into stdout by the shell itself, so the returned text
/// keeps the order in which the command wrote it and the marker line stays last.
#[derive(Debug, Clone)]
pub struct LocalShellSession {
    home: Utf8PathBuf,
    shell: String,
}

impl LocalShellSession {
    /// Session rooted at `home`, using `sh`.
    #[must_use]
    pub fn new(home: impl Into<Utf8PathBuf>) -> Self {
        Self {
            home: home.into(),
            shell: "sh".to_string(),
        }
    }

    /// Use another POSIX shell, e.g. `bash`.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    #[must_use]
    pub fn home(&self) -> &Utf8Path {
        &self.home
    }

    /// Filesystem view rooted at the same directory.
    #[must_use]
    pub fn files(&self) -> LocalFileSystem {
        LocalFileSystem::new(self.home.clone())
    }
}

impl RemoteSession for LocalShellSession {
    fn issue_command(&mut self, command: &str) -> Result<String, SessionError> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(merge_stderr(command))
            .current_dir(&self.home)
            .output()
            .map_err(|source| SessionError::Spawn {
                program: self.shell.clone(),
                source,
            })?;

        debug!(
            shell = %self.shell,
            status = ?output.status.code(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Local command finished"
        );

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(combined)
    }

    fn describe(&self) -> String {
        format!("local:{}", self.home)
    }
}

/// Local directory exposed through [`RemoteFileSystem`].
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    home: Utf8PathBuf,
}

impl LocalFileSystem {
    #[must_use]
    pub fn new(home: impl Into<Utf8PathBuf>) -> Self {
        Self { home: home.into() }
    }
}

impl RemoteFileSystem for LocalFileSystem {
    fn home(&self) -> &Utf8Path {
        &self.home
    }

    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }

    fn write(&self, path: &Utf8Path, content: &[u8]) -> io::Result<()> {
        fs::write(self.resolve(path), content)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        shellproof_utils::paths::ensure_dir_all(self.resolve(path))
    }

    fn exists(&self, path: &Utf8Path) -> io::Result<bool> {
        self.resolve(path).as_std_path().try_exists()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session_in(dir: &TempDir) -> LocalShellSession {
        LocalShellSession::new(Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap())
    }

    #[test]
    fn test_local_session_echoes_marker() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);

        assert_eq!(session.issue_command("false;echo rc=$?").unwrap(), "rc=1\n");
        assert_eq!(session.issue_command("true;echo rc=$?").unwrap(), "rc=0\n");
    }

    #[test]
    fn test_local_session_runs_in_home() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let files = session.files();

        session.issue_command("echo hello > run.log").unwrap();

        assert_eq!(files.read(Utf8Path::new("run.log")).unwrap(), b"hello\n");
        assert!(files.exists(Utf8Path::new("run.log")).unwrap());
        assert!(!files.exists(Utf8Path::new("missing.log")).unwrap());
    }

    #[test]
    fn test_local_session_keeps_stderr_in_write_order() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);

        let output = session.issue_command("echo oops >&2; echo out").unwrap();
        assert_eq!(output, "oops\nout\n");
    }

    #[test]
    fn test_marker_text_on_stderr_does_not_mask_failure() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);

        let output = session
            .issue_command("echo 'child rc=0' >&2; false;echo rc=$?")
            .unwrap();
        assert_eq!(output, "child rc=0\nrc=1\n");
        assert_eq!(crate::marker::parse_marker(&output, "rc"), Some(1));

        let output = session.issue_command("echo rc=0 >&2; false;echo rc=$?").unwrap();
        assert_eq!(crate::marker::parse_marker(&output, "rc"), Some(1));
    }

    #[test]
    fn test_missing_shell_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir).with_shell("/nonexistent/shell");

        let err = session.issue_command("true").unwrap_err();
        assert!(matches!(err, SessionError::Spawn { .. }));
    }

    #[test]
    fn test_local_fs_create_dir_and_write() {
        let dir = TempDir::new().unwrap();
        let files = session_in(&dir).files();

        files.create_dir_all(Utf8Path::new(".m2")).unwrap();
        files
            .write(Utf8Path::new(".m2/settings.xml"), b"<settings/>")
            .unwrap();

        assert_eq!(
            fs::read(dir.path().join(".m2/settings.xml")).unwrap(),
            b"<settings/>"
        );
    }
}
