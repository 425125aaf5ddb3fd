//! Remote command execution with exit-status markers
//!
//! A remote shell only hands back text, so every command line is sent with a
//! trailing `;echo <marker>=$?`. The runner reads the status back out of the
//! output, archives the log files the command produced, and returns a
//! [`CommandResult`]. A non-zero status is data, not an error: only a broken
//! session or lost evidence surfaces as [`ExecutionError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use shellproof_evidence::DirEvidenceStore;
//! use shellproof_runner::{CommandRunner, CommandSpec, LocalShellSession};
//!
//! let mut session = LocalShellSession::new("/tmp/work");
//! let files = session.files();
//! let evidence = DirEvidenceStore::new("/tmp/evidence");
//!
//! let spec = CommandSpec::new("make check > check.log", "make-rc").log("check.log");
//! let result = CommandRunner::new(&evidence).run(&mut session, &files, &spec)?;
//! assert!(result.succeeded());
//! # Ok::<(), shellproof_runner::ExecutionError>(())
//! ```

pub mod command_runner;
pub mod command_spec;
pub mod error;
pub mod local;
pub mod marker;
pub mod result;
pub mod session;
pub mod ssh;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use command_runner::CommandRunner;
pub use command_spec::{CommandSpec, LogFile};
pub use error::{EvidenceFailure, ExecutionError, ExecutionErrorKind, SessionError};
pub use local::{LocalFileSystem, LocalShellSession};
pub use result::CommandResult;
pub use session::{RemoteFileSystem, RemoteSession};
pub use ssh::{SshFileSystem, SshSession, SshTarget};
