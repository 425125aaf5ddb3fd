use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

use super::{CliArgs, Config, ConfigError, ConfigSource, EvidenceConfig, RuntimeConfig, SessionConfig};

/// Environment variable overriding `[runtime].maven_repository`
pub const MAVEN_REPOSITORY_ENV: &str = "SHELLPROOF_MAVEN_REPOSITORY";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    session: Option<SessionConfig>,
    evidence: Option<EvidenceConfig>,
    runtime: Option<RuntimeConfig>,
}

/// Copy `$field` from `$from` into `$into` when set, recording `$source` under `$key`.
macro_rules! overlay {
    ($attr:ident, $source:expr, $into:ident, $from:ident, { $($field:ident => $key:literal),+ $(,)? }) => {
        $(
            if let Some(value) = $from.$field {
                $into.$field = Some(value);
                $attr.insert($key.to_string(), $source.clone());
            }
        )+
    };
}

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let cwd = env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
            reason: format!("cannot determine current directory: {e}"),
        })?;
        let start_dir =
            Utf8PathBuf::from_path_buf(cwd).map_err(|p| ConfigError::DiscoveryFailed {
                reason: format!("current directory is not UTF-8: {}", p.display()),
            })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(start_dir: &Utf8Path, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut source_attribution = HashMap::new();
        let mut session = SessionConfig::default();
        let mut evidence = EvidenceConfig::default();
        let mut runtime = RuntimeConfig::default();

        for key in [
            "session.kind",
            "session.connect_timeout_secs",
            "evidence.root",
            "evidence.receipts",
            "runtime.version",
            "runtime.test_class",
            "runtime.trace",
        ] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit_path) => Some(explicit_path.clone()),
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            let source = ConfigSource::Config;

            if let Some(file_session) = file_config.session {
                overlay!(source_attribution, source, session, file_session, {
                    kind => "session.kind",
                    host => "session.host",
                    user => "session.user",
                    port => "session.port",
                    identity_file => "session.identity_file",
                    connect_timeout_secs => "session.connect_timeout_secs",
                    home => "session.home",
                });
            }
            if let Some(file_evidence) = file_config.evidence {
                overlay!(source_attribution, source, evidence, file_evidence, {
                    root => "evidence.root",
                    receipts => "evidence.receipts",
                });
            }
            if let Some(file_runtime) = file_config.runtime {
                overlay!(source_attribution, source, runtime, file_runtime, {
                    maven_repository => "runtime.maven_repository",
                    version => "runtime.version",
                    test_class => "runtime.test_class",
                    trace => "runtime.trace",
                });
            }
        }

        // Environment sits between the file and the command line
        if let Ok(repository) = env::var(MAVEN_REPOSITORY_ENV)
            && !repository.is_empty()
        {
            runtime.maven_repository = Some(repository);
            source_attribution.insert("runtime.maven_repository".to_string(), ConfigSource::Cli);
        }

        let cli = cli_args.clone();
        let from_cli = SessionConfig {
            kind: cli.session_kind,
            host: cli.host,
            user: cli.user,
            port: cli.port,
            identity_file: cli.identity_file,
            connect_timeout_secs: None,
            home: cli.home,
        };
        overlay!(source_attribution, ConfigSource::Cli, session, from_cli, {
            kind => "session.kind",
            host => "session.host",
            user => "session.user",
            port => "session.port",
            identity_file => "session.identity_file",
            home => "session.home",
        });
        let from_cli = EvidenceConfig {
            root: cli.evidence_dir,
            receipts: cli.no_receipts.then_some(false),
        };
        overlay!(source_attribution, ConfigSource::Cli, evidence, from_cli, {
            root => "evidence.root",
            receipts => "evidence.receipts",
        });
        let from_cli = RuntimeConfig {
            maven_repository: cli.maven_repository,
            version: cli.runtime_version,
            test_class: None,
            trace: None,
        };
        overlay!(source_attribution, ConfigSource::Cli, runtime, from_cli, {
            maven_repository => "runtime.maven_repository",
            version => "runtime.version",
        });

        let config = Self {
            session,
            evidence,
            runtime,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Discover config file by searching upward from a given directory
    ///
    /// Walks up the directory tree looking for `.shellproof/config.toml`,
    /// stopping at repository root markers (.git, .hg, .svn) or the
    /// filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        for dir in start_dir.ancestors() {
            let config_path = dir.join(".shellproof").join("config.toml");
            if config_path.is_file() {
                return Some(config_path);
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists() {
                break;
            }
        }

        None
    }

    fn load_config_file(path: &Utf8Path) -> Result<TomlConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionKind;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn write_config(root: &Utf8Path, content: &str) -> Utf8PathBuf {
        let dir = root.join(".shellproof");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        fs::create_dir(root.join(".git")).unwrap();

        let config = Config::discover_from(&root, &CliArgs::default()).unwrap();

        assert_eq!(config.session_kind(), SessionKind::Local);
        assert_eq!(config.source_of("session.kind"), ConfigSource::Default);
        assert!(config.receipts_enabled());
    }

    #[test]
    #[serial]
    fn test_file_found_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        fs::create_dir(root.join(".git")).unwrap();
        write_config(
            &root,
            r#"
[session]
kind = "ssh"
host = "linux-primary"
user = "ivt"

[runtime]
version = "0.4.0"
"#,
        );
        let nested = root.join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();

        assert_eq!(config.session_kind(), SessionKind::Ssh);
        assert_eq!(config.session.host.as_deref(), Some("linux-primary"));
        assert_eq!(config.runtime_version(), "0.4.0");
        assert_eq!(config.source_of("session.host"), ConfigSource::Config);
    }

    #[test]
    fn test_discovery_stops_at_repository_root() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        write_config(&root, "[session]\nkind = \"local\"\n");
        let repo = root.join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert_eq!(Config::discover_config_file_from(&repo), None);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        fs::create_dir(root.join(".git")).unwrap();
        write_config(&root, "[session]\nkind = \"ssh\"\nhost = \"from-file\"\n");

        let cli = CliArgs {
            host: Some("from-cli".to_string()),
            no_receipts: true,
            ..CliArgs::default()
        };
        let config = Config::discover_from(&root, &cli).unwrap();

        assert_eq!(config.session.host.as_deref(), Some("from-cli"));
        assert_eq!(config.source_of("session.host"), ConfigSource::Cli);
        assert_eq!(config.source_of("session.kind"), ConfigSource::Config);
        assert!(!config.receipts_enabled());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_but_not_cli() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        fs::create_dir(root.join(".git")).unwrap();
        write_config(&root, "[runtime]\nmaven_repository = \"https://file.example\"\n");

        // SAFETY: serialized test; no other thread reads the environment
        unsafe { env::set_var(MAVEN_REPOSITORY_ENV, "https://env.example") };
        let from_env = Config::discover_from(&root, &CliArgs::default());
        let cli = CliArgs {
            maven_repository: Some("https://cli.example".to_string()),
            ..CliArgs::default()
        };
        let from_cli = Config::discover_from(&root, &cli);
        unsafe { env::remove_var(MAVEN_REPOSITORY_ENV) };

        assert_eq!(from_env.unwrap().maven_repository(), Some("https://env.example"));
        assert_eq!(from_cli.unwrap().maven_repository(), Some("https://cli.example"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let cli = CliArgs {
            config_path: Some(utf8_dir(&temp).join("nope.toml")),
            ..CliArgs::default()
        };
        let err = Config::discover_from(&utf8_dir(&temp), &cli).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_unknown_key_is_invalid_file() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        let path = write_config(&root, "[session]\nhots = \"typo\"\n");
        let cli = CliArgs {
            config_path: Some(path),
            ..CliArgs::default()
        };
        let err = Config::discover_from(&root, &cli).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFile { .. }));
    }
}
