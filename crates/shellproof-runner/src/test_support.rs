//! In-memory sessions and filesystems for tests
//!
//! Available to other crates through the `test-utils` feature.

use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;

use crate::{RemoteFileSystem, RemoteSession, SessionError};

enum Reply {
    Output(String),
    Fail(String),
}

/// A session that answers from a queue and records what it was sent.
///
/// Once the queue is empty every further command fails with
/// [`SessionError::Closed`].
#[derive(Default)]
pub struct ScriptedSession {
    replies: VecDeque<Reply>,
    sent: Vec<String>,
}

impl ScriptedSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `output` as the answer to the next command.
    #[must_use]
    pub fn respond(mut self, output: impl Into<String>) -> Self {
        self.replies.push_back(Reply::Output(output.into()));
        self
    }

    /// Queue a transport failure for the next command.
    #[must_use]
    pub fn fail(mut self, reason: impl Into<String>) -> Self {
        self.replies.push_back(Reply::Fail(reason.into()));
        self
    }

    /// Command lines received so far
    #[must_use]
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

impl RemoteSession for ScriptedSession {
    fn issue_command(&mut self, command: &str) -> Result<String, SessionError> {
        self.sent.push(command.to_string());
        match self.replies.pop_front() {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Fail(reason)) => Err(SessionError::Closed { reason }),
            None => Err(SessionError::Closed {
                reason: "scripted session has no more replies".to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Filesystem kept in a map of absolute paths.
pub struct MemoryFileSystem {
    home: Utf8PathBuf,
    files: RefCell<BTreeMap<Utf8PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<Utf8PathBuf>>,
    unreadable: BTreeSet<Utf8PathBuf>,
}

impl MemoryFileSystem {
    #[must_use]
    pub fn new(home: impl Into<Utf8PathBuf>) -> Self {
        let home = home.into();
        let dirs = BTreeSet::from([home.clone()]);
        Self {
            home,
            files: RefCell::new(BTreeMap::new()),
            dirs: RefCell::new(dirs),
            unreadable: BTreeSet::new(),
        }
    }

    /// Seed a file, relative to home unless absolute.
    #[must_use]
    pub fn with_file(self, path: &str, content: &[u8]) -> Self {
        let resolved = self.resolve(Utf8Path::new(path));
        self.files.borrow_mut().insert(resolved, content.to_vec());
        self
    }

    /// Make reads of `path` fail with `PermissionDenied`.
    #[must_use]
    pub fn with_unreadable(mut self, path: &str) -> Self {
        let resolved = self.resolve(Utf8Path::new(path));
        self.files.borrow_mut().insert(resolved.clone(), Vec::new());
        self.unreadable.insert(resolved);
        self
    }

    /// Current content of `path`.
    #[must_use]
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let resolved = self.resolve(Utf8Path::new(path));
        self.files.borrow().get(&resolved).cloned()
    }

    /// Whether a directory was created at `path`.
    #[must_use]
    pub fn has_dir(&self, path: &str) -> bool {
        let resolved = self.resolve(Utf8Path::new(path));
        self.dirs.borrow().contains(&resolved)
    }
}

impl RemoteFileSystem for MemoryFileSystem {
    fn home(&self) -> &Utf8Path {
        &self.home
    }

    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        let resolved = self.resolve(path);
        if self.unreadable.contains(&resolved) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{resolved}: Permission denied"),
            ));
        }
        self.files.borrow().get(&resolved).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{resolved}: No such file or directory"),
            )
        })
    }

    fn write(&self, path: &Utf8Path, content: &[u8]) -> io::Result<()> {
        let resolved = self.resolve(path);
        if let Some(parent) = resolved.parent()
            && !self.dirs.borrow().contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{parent}: No such file or directory"),
            ));
        }
        self.files.borrow_mut().insert(resolved, content.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        let resolved = self.resolve(path);
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in resolved.ancestors() {
            dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn exists(&self, path: &Utf8Path) -> io::Result<bool> {
        let resolved = self.resolve(path);
        Ok(self.files.borrow().contains_key(&resolved) || self.dirs.borrow().contains(&resolved))
    }

    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.home.join(path)
        }
    }
}
