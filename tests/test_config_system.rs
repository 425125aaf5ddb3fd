//! Configuration discovery, precedence and attribution through the public API
//!
//! Tests:
//! - Upward discovery of `.shellproof/config.toml`, stopping at `.git`
//! - Precedence: CLI > environment > config file > defaults
//! - Source attribution in `effective_config`
//! - Evidence root falling back to `SHELLPROOF_HOME`
//! - Invalid files and values

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serial_test::serial;
use shellproof::{CliArgs, Config, ConfigError, ConfigSource, SessionKind};
use shellproof_utils::paths::with_isolated_home;
use std::fs;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[session]
kind = "ssh"
host = "linux-primary"
user = "ivt"
port = 2222
identity_file = "keys/ivt_ed25519"
connect_timeout_secs = 45

[evidence]
root = "stored-artifacts"
receipts = false

[runtime]
maven_repository = "https://repo.example.org/maven"
version = "0.3.1"
test_class = "dev.voras.ivt.core/dev.voras.ivt.core.CoreManagerIVT"
trace = false
"#;

fn repo_root(temp: &TempDir) -> Utf8PathBuf {
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    root
}

fn write_config(dir: &Utf8Path, content: &str) -> Utf8PathBuf {
    let config_dir = dir.join(".shellproof");
    fs::create_dir_all(&config_dir).unwrap();
    let path = config_dir.join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_full_file_is_loaded_from_nested_directory() -> Result<()> {
    let temp = TempDir::new()?;
    let root = repo_root(&temp);
    write_config(&root, FULL_CONFIG);
    let nested = root.join("suites/basic");
    fs::create_dir_all(&nested)?;

    let config = Config::discover_from(&nested, &CliArgs::default())?;

    assert_eq!(config.session_kind(), SessionKind::Ssh);
    assert_eq!(config.session.port, Some(2222));
    assert_eq!(config.connect_timeout().as_secs(), 45);
    assert_eq!(config.evidence_root(), Utf8PathBuf::from("stored-artifacts"));
    assert!(!config.receipts_enabled());
    assert_eq!(config.maven_repository(), Some("https://repo.example.org/maven"));
    assert_eq!(config.runtime_version(), "0.3.1");
    assert!(!config.trace());
    Ok(())
}

#[test]
#[serial]
fn test_precedence_cli_over_file_over_default() -> Result<()> {
    let temp = TempDir::new()?;
    let root = repo_root(&temp);
    write_config(&root, "[session]\nkind = \"ssh\"\nhost = \"from-file\"\n");

    let cli = CliArgs {
        port: Some(2200),
        host: Some("from-cli".to_string()),
        ..CliArgs::default()
    };
    let config = Config::discover_from(&root, &cli)?;

    assert_eq!(config.session.host.as_deref(), Some("from-cli"));
    assert_eq!(config.source_of("session.host"), ConfigSource::Cli);
    assert_eq!(config.source_of("session.kind"), ConfigSource::Config);
    assert_eq!(config.source_of("session.connect_timeout_secs"), ConfigSource::Default);
    assert_eq!(config.source_of("session.port"), ConfigSource::Cli);
    Ok(())
}

#[test]
#[serial]
fn test_effective_config_reports_value_and_source() -> Result<()> {
    let temp = TempDir::new()?;
    let root = repo_root(&temp);
    write_config(&root, FULL_CONFIG);

    let cli = CliArgs {
        runtime_version: Some("0.4.0-SNAPSHOT".to_string()),
        ..CliArgs::default()
    };
    let effective = Config::discover_from(&root, &cli)?.effective_config();

    assert_eq!(
        effective.get("runtime.version"),
        Some(&("0.4.0-SNAPSHOT".to_string(), "cli".to_string()))
    );
    assert_eq!(
        effective.get("session.user"),
        Some(&("ivt".to_string(), "config".to_string()))
    );
    assert_eq!(
        effective.get("evidence.receipts"),
        Some(&("false".to_string(), "config".to_string()))
    );
    // Sorted by key
    let keys: Vec<_> = effective.keys().cloned().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    Ok(())
}

#[test]
#[serial]
fn test_defaults_without_any_file() -> Result<()> {
    let temp = TempDir::new()?;
    let root = repo_root(&temp);
    let _home = with_isolated_home();

    let config = Config::discover_from(&root, &CliArgs::default())?;
    let effective = config.effective_config();

    assert_eq!(config.session_kind(), SessionKind::Local);
    assert!(config.receipts_enabled());
    assert!(config.maven_repository().is_none());
    assert!(config.evidence_root().ends_with("evidence"));
    assert!(!effective.contains_key("runtime.maven_repository"));
    assert_eq!(effective["session.kind"].1, "default");
    Ok(())
}

#[test]
#[serial]
fn test_explicit_config_path_skips_discovery() -> Result<()> {
    let temp = TempDir::new()?;
    let root = repo_root(&temp);
    write_config(&root, "[runtime]\nversion = \"from-discovered\"\n");
    let explicit = root.join("other.toml");
    fs::write(&explicit, "[runtime]\nversion = \"from-explicit\"\n")?;

    let cli = CliArgs {
        config_path: Some(explicit),
        ..CliArgs::default()
    };
    let config = Config::discover_from(&root, &cli)?;

    assert_eq!(config.runtime_version(), "from-explicit");
    Ok(())
}

#[test]
#[serial]
fn test_ssh_without_host_is_rejected() {
    let temp = TempDir::new().unwrap();
    let root = repo_root(&temp);
    write_config(&root, "[session]\nkind = \"ssh\"\n");

    let err = Config::discover_from(&root, &CliArgs::default()).unwrap_err();

    assert!(matches!(err, ConfigError::MissingRequired(ref key) if key == "session.host"));
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    let temp = TempDir::new().unwrap();
    let root = repo_root(&temp);

    for content in [
        "[session]\nport = 0\n",
        "[session]\nconnect_timeout_secs = 0\n",
        "[runtime]\nversion = \"0.3 .0\"\n",
        "[runtime]\nmaven_repository = \"  \"\n",
    ] {
        write_config(&root, content);
        let err = Config::discover_from(&root, &CliArgs::default()).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { .. }),
            "expected InvalidValue for {content:?}, got {err:?}"
        );
    }
}

#[test]
#[serial]
fn test_malformed_toml_is_invalid_file() {
    let temp = TempDir::new().unwrap();
    let root = repo_root(&temp);
    write_config(&root, "[session\nkind = ");

    let err = Config::discover_from(&root, &CliArgs::default()).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidFile { .. }));
}
