//! Serializable types shared across shellproof crates

use serde::{Deserialize, Serialize};

/// Source of a configuration value.
///
/// Indicates where a configuration value originated from in the precedence chain:
/// CLI arguments > environment > config file > programmatic overrides > built-in defaults.
///
/// Serializes to lowercase strings: `"cli"`, `"config"`, `"programmatic"`, `"default"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument or environment (highest precedence).
    Cli,
    /// Value loaded from configuration file.
    Config,
    /// Value set through the programmatic builder.
    Programmatic,
    /// Built-in default.
    Default,
}

impl ConfigSource {
    /// Stable label used in effective-config output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Config => "config",
            Self::Programmatic => "programmatic",
            Self::Default => "default",
        }
    }
}

/// An archived evidence file and its content hash, as recorded in receipts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHash {
    /// Evidence name, relative to the evidence root
    pub path: String,
    /// BLAKE3 hash of the stored bytes
    pub blake3: String,
    /// Size of the stored bytes
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ConfigSource::Cli).unwrap(), r#""cli""#);
        assert_eq!(
            serde_json::to_string(&ConfigSource::Programmatic).unwrap(),
            r#""programmatic""#
        );
        assert_eq!(ConfigSource::Default.as_str(), "default");
    }
}
