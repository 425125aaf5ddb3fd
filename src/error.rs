//! Top-level error type and its mapping to CLI exit codes

use thiserror::Error;

use shellproof_config::ConfigError;
use shellproof_evidence::EvidenceError;
use shellproof_runner::{ExecutionError, ExecutionErrorKind, SessionError};
use shellproof_utils::error::{ErrorCategory, UserFriendlyError};
use shellproof_utils::exit_codes::ExitCode;

use crate::scenario::{ScenarioError, marker_text};
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum ShellproofError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Evidence error: {0}")]
    Evidence(#[from] EvidenceError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// The command ran and reported a non-zero status, or none at all.
    #[error("Remote command did not report {marker}=0 ({})", marker_text(.exit_marker))]
    CommandFailed {
        marker: String,
        exit_marker: Option<i32>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn execution_exit_code(err: &ExecutionError) -> ExitCode {
    match err.kind() {
        ExecutionErrorKind::InvalidSpec => ExitCode::CLI_ARGS,
        ExecutionErrorKind::SessionUnavailable => ExitCode::SESSION_UNAVAILABLE,
        ExecutionErrorKind::EvidenceCopyFailed => ExitCode::EVIDENCE_FAILED,
    }
}

impl ShellproofError {
    /// Map this error to the CLI exit code.
    ///
    /// ```rust
    /// use shellproof::ShellproofError;
    /// use shellproof_utils::exit_codes::ExitCode;
    ///
    /// let err = ShellproofError::CommandFailed { marker: "rc".to_string(), exit_marker: Some(1) };
    /// assert_eq!(err.to_exit_code(), ExitCode::COMMAND_FAILED);
    /// ```
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::Template(_) => ExitCode::CLI_ARGS,
            Self::Session(_) => ExitCode::SESSION_UNAVAILABLE,
            Self::Execution(err) => execution_exit_code(err),
            Self::Evidence(_) => ExitCode::EVIDENCE_FAILED,
            Self::Scenario(err) => match err {
                ScenarioError::MissingRepository | ScenarioError::Template(_) => ExitCode::CLI_ARGS,
                ScenarioError::RemoteFile { .. } => ExitCode::SESSION_UNAVAILABLE,
                ScenarioError::Execution { source, .. } => execution_exit_code(source),
                ScenarioError::StepFailed { .. } => ExitCode::COMMAND_FAILED,
            },
            Self::CommandFailed { .. } => ExitCode::COMMAND_FAILED,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

impl UserFriendlyError for ShellproofError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Session(err) => format!("The remote session could not be opened: {err}"),
            Self::Execution(err) => err.user_message(),
            Self::Evidence(err) => err.user_message(),
            Self::Template(err) => err.user_message(),
            Self::Scenario(err) => err.user_message(),
            Self::CommandFailed { .. } | Self::Io(_) => self.to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Execution(err) => err.context(),
            Self::Evidence(err) => err.context(),
            Self::Template(err) => err.context(),
            Self::Scenario(err) => err.context(),
            Self::CommandFailed { exit_marker: None, .. } => Some(
                "The marker never appeared in the output; the remote shell may have exited early."
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Session(_) => vec![
                "Check the host, user and port settings".to_string(),
                "Run 'shellproof config' to see the effective configuration".to_string(),
            ],
            Self::Execution(err) => err.suggestions(),
            Self::Evidence(err) => err.suggestions(),
            Self::Template(err) => err.suggestions(),
            Self::Scenario(err) => err.suggestions(),
            Self::CommandFailed { .. } => {
                vec!["Inspect the archived logs in the evidence directory".to_string()]
            }
            Self::Io(_) => vec!["Run with --verbose for more detail".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Session(_) => ErrorCategory::Session,
            Self::Execution(err) => err.category(),
            Self::Evidence(err) => err.category(),
            Self::Template(err) => err.category(),
            Self::Scenario(err) => err.category(),
            Self::CommandFailed { .. } => ErrorCategory::Scenario,
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}
