use std::collections::BTreeMap;

use super::Config;

impl Config {
    /// Effective configuration as `key -> (value, source)`, sorted by key.
    ///
    /// Keys without a value and without a default are omitted.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: Option<String>| {
            if let Some(val) = value {
                let source = self.source_of(key).as_str().to_string();
                config.insert(key.to_string(), (val, source));
            }
        };

        add("session.kind", Some(self.session_kind().to_string()));
        add("session.host", self.session.host.clone());
        add("session.user", self.session.user.clone());
        add("session.port", self.session.port.map(|p| p.to_string()));
        add(
            "session.identity_file",
            self.session.identity_file.as_ref().map(ToString::to_string),
        );
        add(
            "session.connect_timeout_secs",
            Some(self.connect_timeout().as_secs().to_string()),
        );
        add("session.home", self.session.home.as_ref().map(ToString::to_string));

        add("evidence.root", Some(self.evidence_root().to_string()));
        add("evidence.receipts", Some(self.receipts_enabled().to_string()));

        add(
            "runtime.maven_repository",
            self.runtime.maven_repository.clone(),
        );
        add("runtime.version", Some(self.runtime_version().to_string()));
        add("runtime.test_class", Some(self.test_class().to_string()));
        add("runtime.trace", Some(self.trace().to_string()));

        config
    }
}
