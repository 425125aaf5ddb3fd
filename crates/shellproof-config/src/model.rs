use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use strum::{Display, EnumString};

use shellproof_utils::paths::default_evidence_root;

use crate::ConfigSource;

/// Default runtime version fetched by the smoke scenario
pub const DEFAULT_RUNTIME_VERSION: &str = "0.3.0-SNAPSHOT";

/// Default test class run by the smoke scenario
pub const DEFAULT_TEST_CLASS: &str = "dev.voras.ivt.core/dev.voras.ivt.core.CoreManagerIVT";

/// Default ssh connect timeout
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Which session provider to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Local,
    Ssh,
}

/// `[session]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub kind: Option<SessionKind>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<Utf8PathBuf>,
    pub connect_timeout_secs: Option<u64>,
    /// Remote home directory; asked from the host when unset
    pub home: Option<Utf8PathBuf>,
}

/// `[evidence]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvidenceConfig {
    pub root: Option<Utf8PathBuf>,
    pub receipts: Option<bool>,
}

/// `[runtime]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    pub maven_repository: Option<String>,
    pub version: Option<String>,
    pub test_class: Option<String>,
    pub trace: Option<bool>,
}

/// Resolved configuration with source attribution
#[derive(Debug, Clone)]
pub struct Config {
    pub session: SessionConfig,
    pub evidence: EvidenceConfig,
    pub runtime: RuntimeConfig,
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Config {
    #[must_use]
    pub fn session_kind(&self) -> SessionKind {
        self.session.kind.unwrap_or_default()
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.session
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Evidence root, `<SHELLPROOF_HOME>/evidence` unless configured
    #[must_use]
    pub fn evidence_root(&self) -> Utf8PathBuf {
        self.evidence
            .root
            .clone()
            .unwrap_or_else(default_evidence_root)
    }

    #[must_use]
    pub fn receipts_enabled(&self) -> bool {
        self.evidence.receipts.unwrap_or(true)
    }

    #[must_use]
    pub fn maven_repository(&self) -> Option<&str> {
        self.runtime.maven_repository.as_deref()
    }

    #[must_use]
    pub fn runtime_version(&self) -> &str {
        self.runtime
            .version
            .as_deref()
            .unwrap_or(DEFAULT_RUNTIME_VERSION)
    }

    #[must_use]
    pub fn test_class(&self) -> &str {
        self.runtime
            .test_class
            .as_deref()
            .unwrap_or(DEFAULT_TEST_CLASS)
    }

    #[must_use]
    pub fn trace(&self) -> bool {
        self.runtime.trace.unwrap_or(true)
    }

    /// Where `key` came from; unset keys count as defaults.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .cloned()
            .unwrap_or(ConfigSource::Default)
    }
}
