use camino::Utf8PathBuf;
use thiserror::Error;

use shellproof_utils::error::{ErrorCategory, UserFriendlyError};

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file {path}: {source}")]
    InvalidFile {
        path: Utf8PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { path, source } => {
                format!("Configuration file '{path}' could not be read: {source}")
            }
            Self::InvalidFile { path, source } => {
                format!("Configuration file '{path}' has invalid format: {source}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile { .. } => Some(
                "Configuration files use TOML with [session], [evidence] and [runtime] sections."
                    .to_string(),
            ),
            Self::MissingRequired(key) if key.starts_with("session.") => Some(
                "ssh sessions need a host; local sessions need nothing else.".to_string(),
            ),
            Self::DiscoveryFailed { .. } => Some(
                "shellproof searches upward for .shellproof/config.toml and stops at the repository root."
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Read { .. } => vec![
                "Check that the file exists and is readable".to_string(),
                "Pass a different file with --config".to_string(),
            ],
            Self::InvalidFile { .. } => vec![
                "Check the TOML syntax near the reported line".to_string(),
                "Run 'shellproof config' to see the effective configuration".to_string(),
            ],
            Self::MissingRequired(key) => vec![
                format!("Set '{key}' in .shellproof/config.toml"),
                "Or pass the matching command-line flag, e.g. --host".to_string(),
            ],
            Self::InvalidValue { key, .. } => vec![
                format!("Fix the value of '{key}'"),
                "Run 'shellproof config' to see where each value comes from".to_string(),
            ],
            Self::DiscoveryFailed { .. } => vec![
                "Pass an explicit file with --config".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}
