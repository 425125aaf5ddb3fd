use super::{Config, ConfigError, SessionKind};

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.session_kind() == SessionKind::Ssh {
            match self.session.host.as_deref() {
                None => return Err(ConfigError::MissingRequired("session.host".to_string())),
                Some(host) if host.trim().is_empty() => {
                    return Err(ConfigError::invalid("session.host", "must not be empty"));
                }
                Some(_) => {}
            }
        }

        if self.session.port == Some(0) {
            return Err(ConfigError::invalid(
                "session.port",
                "must be between 1 and 65535",
            ));
        }

        if let Some(timeout) = self.session.connect_timeout_secs
            && !(1..=600).contains(&timeout)
        {
            return Err(ConfigError::invalid(
                "session.connect_timeout_secs",
                format!("{timeout} is outside 1..=600 seconds"),
            ));
        }

        if let Some(user) = &self.session.user
            && user.trim().is_empty()
        {
            return Err(ConfigError::invalid("session.user", "must not be empty"));
        }

        if let Some(root) = &self.evidence.root
            && root.as_str().trim().is_empty()
        {
            return Err(ConfigError::invalid("evidence.root", "must not be empty"));
        }

        if let Some(repository) = &self.runtime.maven_repository
            && repository.trim().is_empty()
        {
            return Err(ConfigError::invalid(
                "runtime.maven_repository",
                "must not be empty",
            ));
        }

        if let Some(version) = &self.runtime.version
            && (version.trim().is_empty() || version.contains(char::is_whitespace))
        {
            return Err(ConfigError::invalid(
                "runtime.version",
                format!("'{version}' is not a version"),
            ));
        }

        Ok(())
    }
}
