use thiserror::Error;

use shellproof_utils::error::{ErrorCategory, UserFriendlyError};
use shellproof_utils::paths::PathError;

/// Errors raised while persisting evidence
#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("Invalid evidence name '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: PathError,
    },

    #[error("Evidence write failed at {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Receipt serialization failed: {reason}")]
    ReceiptSerialization { reason: String },
}

impl UserFriendlyError for EvidenceError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidName { name, source } => {
                format!("Evidence name '{name}' is not usable: {source}")
            }
            Self::WriteFailed { path, reason } => {
                format!("Could not write evidence file {path}: {reason}")
            }
            Self::ReceiptSerialization { reason } => {
                format!("Could not serialize the run receipt: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidName { .. } => Some(
                "Evidence names are relative paths inside the evidence root.".to_string(),
            ),
            Self::WriteFailed { .. } => Some(
                "Evidence is written atomically; a failed write leaves no partial file."
                    .to_string(),
            ),
            Self::ReceiptSerialization { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidName { .. } => vec![
                "Use a relative name such as 'mvn.log' or 'logs/run.log'".to_string(),
                "Do not use '..' or absolute paths in evidence names".to_string(),
            ],
            Self::WriteFailed { .. } => vec![
                "Check that the evidence directory is writable".to_string(),
                "Check free disk space".to_string(),
                "Point --evidence-dir at another location".to_string(),
            ],
            Self::ReceiptSerialization { .. } => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidName { .. } => ErrorCategory::Validation,
            Self::WriteFailed { .. } => ErrorCategory::FileSystem,
            Self::ReceiptSerialization { .. } => ErrorCategory::Evidence,
        }
    }
}
