use camino::Utf8PathBuf;
use std::collections::HashMap;

use super::{Config, ConfigError, ConfigSource, EvidenceConfig, RuntimeConfig, SessionConfig, SessionKind};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when embedding shellproof in another harness that already
    /// knows where to connect and does not want file discovery.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shellproof_config::{Config, SessionKind};
    ///
    /// let config = Config::builder()
    ///     .session_kind(SessionKind::Ssh)
    ///     .host("linux-primary")
    ///     .maven_repository("https://repo.example.org/maven")
    ///     .build()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.session.host.as_deref(), Some("linux-primary"));
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// All values set via the builder are attributed to
/// [`ConfigSource::Programmatic`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    session: SessionConfig,
    evidence: EvidenceConfig,
    runtime: RuntimeConfig,
    set: Vec<&'static str>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mark(mut self, key: &'static str) -> Self {
        self.set.push(key);
        self
    }

    #[must_use]
    pub fn session_kind(mut self, kind: SessionKind) -> Self {
        self.session.kind = Some(kind);
        self.mark("session.kind")
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.session.host = Some(host.into());
        self.mark("session.host")
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.session.user = Some(user.into());
        self.mark("session.user")
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.session.port = Some(port);
        self.mark("session.port")
    }

    #[must_use]
    pub fn identity_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.session.identity_file = Some(path.into());
        self.mark("session.identity_file")
    }

    #[must_use]
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.session.connect_timeout_secs = Some(secs);
        self.mark("session.connect_timeout_secs")
    }

    /// Remote home directory, skipping the lookup on connect.
    #[must_use]
    pub fn home(mut self, home: impl Into<Utf8PathBuf>) -> Self {
        self.session.home = Some(home.into());
        self.mark("session.home")
    }

    #[must_use]
    pub fn evidence_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.evidence.root = Some(root.into());
        self.mark("evidence.root")
    }

    #[must_use]
    pub fn receipts(mut self, enabled: bool) -> Self {
        self.evidence.receipts = Some(enabled);
        self.mark("evidence.receipts")
    }

    #[must_use]
    pub fn maven_repository(mut self, url: impl Into<String>) -> Self {
        self.runtime.maven_repository = Some(url.into());
        self.mark("runtime.maven_repository")
    }

    #[must_use]
    pub fn runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime.version = Some(version.into());
        self.mark("runtime.version")
    }

    #[must_use]
    pub fn test_class(mut self, class: impl Into<String>) -> Self {
        self.runtime.test_class = Some(class.into());
        self.mark("runtime.test_class")
    }

    #[must_use]
    pub fn trace(mut self, enabled: bool) -> Self {
        self.runtime.trace = Some(enabled);
        self.mark("runtime.trace")
    }

    /// Validate and build.
    pub fn build(self) -> Result<Config, ConfigError> {
        let source_attribution: HashMap<String, ConfigSource> = self
            .set
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Programmatic))
            .collect();

        let config = Config {
            session: self.session,
            evidence: self.evidence,
            runtime: self.runtime,
            source_attribution,
        };
        config.validate()?;
        Ok(config)
    }
}
