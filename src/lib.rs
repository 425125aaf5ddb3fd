//! shellproof - remote shell commands with exit-status markers and archived evidence
//!
//! A remote shell hands back text, not exit codes. shellproof sends each
//! command line with a trailing `;echo <marker>=$?`, reads the status back
//! out of the output, and copies the log files the command produced into an
//! evidence directory with a JSON receipt per command.
//!
//! shellproof can be used in two ways:
//! - **CLI**: `shellproof run --marker rc --log run.log -- './run.sh > run.log'`
//! - **Library**: build a [`TestContext`] and drive a [`CommandRunner`] or the
//!   [`RuntimeSmokeTest`] scenario from your own harness
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use shellproof::{CommandSpec, Config, OpenSession, TestContext};
//! use shellproof_evidence::DirEvidenceStore;
//!
//! let config = Config::builder().home("/tmp/work").build()?;
//! let evidence = DirEvidenceStore::new(config.evidence_root());
//! let mut opened = OpenSession::open(&config)?;
//! let (session, files) = opened.parts();
//! let mut ctx = TestContext::new(session, files, &evidence, &config);
//!
//! let result = ctx.run(&CommandSpec::new("make check > check.log", "make-rc").log("check.log"))?;
//! println!("succeeded: {}", result.succeeded());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Exit codes
//!
//! See [`ExitCode`]: a non-zero marker is `3`, an unusable session `4`, lost
//! evidence `5`.

pub mod cli;
pub mod context;
pub mod error;
pub mod scenario;
pub mod template;

pub use context::{OpenSession, TestContext};
pub use error::ShellproofError;
pub use scenario::{RuntimeSmokeTest, ScenarioError, ScenarioReport, StepOutcome};
pub use template::{SETTINGS_TEMPLATE, TemplateError, render, render_settings};

pub use shellproof_config::{CliArgs, Config, ConfigBuilder, ConfigError, ConfigSource, SessionKind};
pub use shellproof_runner::{
    CommandResult, CommandRunner, CommandSpec, ExecutionError, ExecutionErrorKind, LogFile,
    RemoteFileSystem, RemoteSession, SessionError,
};
pub use shellproof_utils::canonicalization::emit_jcs;
pub use shellproof_utils::exit_codes::ExitCode;
