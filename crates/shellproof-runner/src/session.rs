//! Capabilities the runner borrows from a session provider

use camino::{Utf8Path, Utf8PathBuf};
use std::io;

use crate::SessionError;

/// An established shell on a remote host.
///
/// The runner borrows a session per call and never opens, closes or
/// reconnects it. `&mut self` keeps a session to one in-flight command.
pub trait RemoteSession {
    /// Send `command` to the shell and return its combined output.
    ///
    /// A command that runs and fails is still `Ok`; only a session that
    /// cannot take the command (broken pipe, connection refused) is `Err`.
    fn issue_command(&mut self, command: &str) -> Result<String, SessionError>;

    /// Short description for logs, e.g. `ssh:ivt@linux-primary`.
    fn describe(&self) -> String;
}

impl<T: RemoteSession + ?Sized> RemoteSession for &mut T {
    fn issue_command(&mut self, command: &str) -> Result<String, SessionError> {
        (**self).issue_command(command)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Filesystem of the host a session runs on, rooted at the session's home.
///
/// Relative paths resolve against [`home`](Self::home); absolute paths are
/// used as-is.
pub trait RemoteFileSystem {
    /// Home directory of the session user
    fn home(&self) -> &Utf8Path;

    /// Read a whole file.
    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>>;

    /// Create or replace a file.
    fn write(&self, path: &Utf8Path, content: &[u8]) -> io::Result<()>;

    /// mkdir -p
    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()>;

    fn exists(&self, path: &Utf8Path) -> io::Result<bool>;

    /// Absolute location of `path` on the remote host.
    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.home().join(path)
    }
}

/// Prefix `command` so the shell sends its stderr down stdout.
///
/// The marker echo then stays the last line of the combined output.
pub(crate) fn merge_stderr(command: &str) -> String {
    format!("exec 2>&1\n{command}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_stderr_runs_before_command() {
        assert_eq!(merge_stderr("false;echo rc=$?"), "exec 2>&1\nfalse;echo rc=$?");
    }
}
