use camino::Utf8PathBuf;

use crate::SessionKind;

/// Configuration values given on the command line.
///
/// Every field is optional; unset fields fall through to the environment,
/// the config file and the defaults.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<Utf8PathBuf>,
    pub session_kind: Option<SessionKind>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<Utf8PathBuf>,
    pub home: Option<Utf8PathBuf>,
    pub evidence_dir: Option<Utf8PathBuf>,
    pub no_receipts: bool,
    pub maven_repository: Option<String>,
    pub runtime_version: Option<String>,
}
