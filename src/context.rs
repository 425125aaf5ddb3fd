//! Explicit wiring of a session, a filesystem, an evidence store and configuration

use camino::Utf8PathBuf;

use shellproof_config::{Config, SessionKind};
use shellproof_evidence::EvidenceStore;
use shellproof_runner::{
    CommandResult, CommandRunner, CommandSpec, ExecutionError, LocalFileSystem,
    LocalShellSession, RemoteFileSystem, RemoteSession, SessionError, SshFileSystem, SshSession,
    SshTarget,
};

/// Everything a test step needs, passed in rather than injected.
pub struct TestContext<'a> {
    pub session: &'a mut dyn RemoteSession,
    pub files: &'a dyn RemoteFileSystem,
    pub evidence: &'a dyn EvidenceStore,
    pub config: &'a Config,
}

impl<'a> TestContext<'a> {
    #[must_use]
    pub fn new(
        session: &'a mut dyn RemoteSession,
        files: &'a dyn RemoteFileSystem,
        evidence: &'a dyn EvidenceStore,
        config: &'a Config,
    ) -> Self {
        Self {
            session,
            files,
            evidence,
            config,
        }
    }

    /// Run one command, writing receipts when the configuration asks for them.
    pub fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult, ExecutionError> {
        CommandRunner::new(self.evidence)
            .with_receipts(self.config.receipts_enabled())
            .run(&mut *self.session, self.files, spec)
    }
}

/// A session opened from configuration, together with its filesystem.
pub enum OpenSession {
    Local(LocalShellSession, LocalFileSystem),
    Ssh(SshSession, SshFileSystem),
}

impl OpenSession {
    /// Open the session `config` describes.
    ///
    /// Local sessions are rooted at `[session].home`, or at the current
    /// directory when unset.
    pub fn open(config: &Config) -> Result<Self, SessionError> {
        match config.session_kind() {
            SessionKind::Local => {
                let home = match &config.session.home {
                    Some(home) => home.clone(),
                    None => current_dir()?,
                };
                let session = LocalShellSession::new(home);
                let files = session.files();
                Ok(Self::Local(session, files))
            }
            SessionKind::Ssh => {
                let mut target = SshTarget::new(config.session.host.clone().unwrap_or_default());
                target.user = config.session.user.clone();
                target.port = config.session.port;
                target.identity_file = config.session.identity_file.clone();
                target.connect_timeout = config.connect_timeout();

                let session = SshSession::connect(target, config.session.home.clone())?;
                let files = session.files();
                Ok(Self::Ssh(session, files))
            }
        }
    }

    /// Borrow the session and its filesystem at the same time.
    pub fn parts(&mut self) -> (&mut dyn RemoteSession, &dyn RemoteFileSystem) {
        match self {
            Self::Local(session, files) => (
                session as &mut dyn RemoteSession,
                files as &dyn RemoteFileSystem,
            ),
            Self::Ssh(session, files) => (
                session as &mut dyn RemoteSession,
                files as &dyn RemoteFileSystem,
            ),
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf, SessionError> {
    let spawn_error = |source| SessionError::Spawn {
        program: "sh".to_string(),
        source,
    };
    let cwd = std::env::current_dir().map_err(spawn_error)?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|p| {
        spawn_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("working directory is not UTF-8: {}", p.display()),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellproof_evidence::MemoryEvidenceStore;
    use shellproof_runner::test_support::{MemoryFileSystem, ScriptedSession};

    #[test]
    fn test_context_run_honours_receipt_setting() {
        let evidence = MemoryEvidenceStore::new();
        let files = MemoryFileSystem::new("/home/ivt");
        let config = Config::builder().receipts(false).build().unwrap();
        let mut session = ScriptedSession::new().respond("rc=0\n");

        let mut ctx = TestContext::new(&mut session, &files, &evidence, &config);
        let result = ctx.run(&CommandSpec::new("true", "rc")).unwrap();

        assert!(result.succeeded());
        assert!(evidence.is_empty());
    }

    #[test]
    fn test_open_local_session_uses_configured_home() {
        let config = Config::builder().home("/srv/ivt").build().unwrap();
        let mut opened = OpenSession::open(&config).unwrap();
        let (session, files) = opened.parts();

        assert_eq!(session.describe(), "local:/srv/ivt");
        assert_eq!(files.home(), camino::Utf8Path::new("/srv/ivt"));
    }
}
