//! Error types for remote command execution

use std::io;
use strum::{AsRefStr, Display};
use thiserror::Error;

use shellproof_evidence::EvidenceError;
use shellproof_utils::error::{ErrorCategory, UserFriendlyError};

use crate::CommandResult;

/// Transport-level failures reported by a session provider
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    #[error("Session closed: {reason}")]
    Closed { reason: String },
}

/// Why a log could not be archived
#[derive(Error, Debug)]
pub enum EvidenceFailure {
    #[error("cannot read remote file: {0}")]
    RemoteRead(#[source] io::Error),

    #[error(transparent)]
    Store(#[from] EvidenceError),
}

/// Disjoint failure kinds of [`ExecutionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum ExecutionErrorKind {
    InvalidSpec,
    SessionUnavailable,
    EvidenceCopyFailed,
}

/// Failures of a [`CommandRunner::run`](crate::CommandRunner::run) call.
///
/// A remote command that exits non-zero is not an error; see
/// [`CommandResult::succeeded`].
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Invalid command spec: {reason}")]
    InvalidSpec { reason: String },

    #[error("Remote session unavailable: {source}")]
    SessionUnavailable {
        #[from]
        source: SessionError,
    },

    /// The command ran, but a log could not be archived. `result` is what the
    /// command produced; its `copied_logs` lists only the logs stored before
    /// the failure.
    #[error("Evidence copy failed for {path}: {failure}")]
    EvidenceCopyFailed {
        path: String,
        #[source]
        failure: EvidenceFailure,
        result: Box<CommandResult>,
    },
}

impl ExecutionError {
    #[must_use]
    pub fn kind(&self) -> ExecutionErrorKind {
        match self {
            Self::InvalidSpec { .. } => ExecutionErrorKind::InvalidSpec,
            Self::SessionUnavailable { .. } => ExecutionErrorKind::SessionUnavailable,
            Self::EvidenceCopyFailed { .. } => ExecutionErrorKind::EvidenceCopyFailed,
        }
    }

    /// The command outcome, when the command got as far as running.
    #[must_use]
    pub fn result(&self) -> Option<&CommandResult> {
        match self {
            Self::EvidenceCopyFailed { result, .. } => Some(result.as_ref()),
            _ => None,
        }
    }

    pub(crate) fn invalid_spec(reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            reason: reason.into(),
        }
    }
}

impl UserFriendlyError for ExecutionError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidSpec { reason } => format!("The command cannot be sent: {reason}"),
            Self::SessionUnavailable { source } => {
                format!("The remote shell did not accept the command: {source}")
            }
            Self::EvidenceCopyFailed { path, failure, .. } => {
                format!("Log file '{path}' could not be archived: {failure}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidSpec { .. } => None,
            Self::SessionUnavailable { .. } => Some(
                "The session provider owns connecting and reconnecting; nothing was retried."
                    .to_string(),
            ),
            Self::EvidenceCopyFailed { result, .. } => Some(format!(
                "The command itself {} (marker value: {}).",
                if result.succeeded() {
                    "succeeded"
                } else {
                    "failed"
                },
                result
                    .exit_marker_value()
                    .map_or_else(|| "missing".to_string(), |v| v.to_string())
            )),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidSpec { .. } => vec![
                "Pass a non-empty command line".to_string(),
                "Marker names may only contain letters, digits, '_', '-' and '.'".to_string(),
            ],
            Self::SessionUnavailable { .. } => vec![
                "Check that the host is reachable: ssh <host> true".to_string(),
                "Run with --verbose to see the exact command sent".to_string(),
            ],
            Self::EvidenceCopyFailed { .. } => vec![
                "Check that the command redirects its output to the expected log path"
                    .to_string(),
                "Check file permissions in the remote home directory".to_string(),
                "Check that the evidence directory is writable".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSpec { .. } => ErrorCategory::Validation,
            Self::SessionUnavailable { .. } => ErrorCategory::Session,
            Self::EvidenceCopyFailed { .. } => ErrorCategory::Evidence,
        }
    }
}
