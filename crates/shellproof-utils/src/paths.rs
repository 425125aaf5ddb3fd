//! Path helpers: state home resolution and relative-path validation

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use thiserror::Error;

thread_local! {
    static THREAD_HOME: RefCell<Option<Utf8PathBuf>> = const { RefCell::new(None) };
}

/// Errors for paths that must stay inside a root directory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,

    #[error("Absolute path not allowed: {0}")]
    Absolute(String),

    #[error("Parent directory escape not allowed: {0}")]
    ParentEscape(String),
}

/// Resolve shellproof home:
/// 1) thread-local override (tests use this)
/// 2) env `SHELLPROOF_HOME`
/// 3) default ".shellproof"
#[must_use]
pub fn shellproof_home() -> Utf8PathBuf {
    if let Some(tl) = THREAD_HOME.with(|tl| tl.borrow().clone()) {
        return tl;
    }
    if let Ok(p) = std::env::var("SHELLPROOF_HOME")
        && !p.is_empty()
    {
        return Utf8PathBuf::from(p);
    }
    Utf8PathBuf::from(".shellproof")
}

/// Returns `<SHELLPROOF_HOME>/evidence`
#[must_use]
pub fn default_evidence_root() -> Utf8PathBuf {
    shellproof_home().join("evidence")
}

/// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
pub fn ensure_dir_all<P: AsRef<std::path::Path>>(p: P) -> std::io::Result<()> {
    match std::fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// Check that `path` is a non-empty relative path that cannot leave its root.
///
/// `.` components are tolerated; `..`, root and prefix components are not.
pub fn validate_relative(path: &str) -> Result<(), PathError> {
    if path.trim().is_empty() {
        return Err(PathError::Empty);
    }

    let candidate = Utf8Path::new(path);
    for component in candidate.components() {
        match component {
            Utf8Component::Normal(_) | Utf8Component::CurDir => {}
            Utf8Component::ParentDir => return Err(PathError::ParentEscape(path.to_string())),
            Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                return Err(PathError::Absolute(path.to_string()));
            }
        }
    }

    Ok(())
}

/// RAII guard for isolated home that clears thread-local state on drop
#[cfg(any(test, feature = "test-utils"))]
pub struct HomeGuard {
    inner: tempfile::TempDir,
}

#[cfg(any(test, feature = "test-utils"))]
impl Drop for HomeGuard {
    fn drop(&mut self) {
        THREAD_HOME.with(|tl| *tl.borrow_mut() = None);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl std::ops::Deref for HomeGuard {
    type Target = tempfile::TempDir;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Test helper: give this thread a unique shellproof home under the system temp dir.
///
/// Hold the `HomeGuard` for the test's duration so the directory stays alive.
#[cfg(any(test, feature = "test-utils"))]
#[must_use]
pub fn with_isolated_home() -> HomeGuard {
    let td = tempfile::TempDir::new().expect("create temp home");
    let p = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf-8 temp dir");
    THREAD_HOME.with(|tl| *tl.borrow_mut() = Some(p));
    HomeGuard { inner: td }
}
