use camino::{Utf8Component, Utf8Path};
use shellproof_evidence::RECEIPTS_DIR;
use shellproof_utils::paths::validate_relative;

use crate::ExecutionError;
use crate::marker::{command_body, validate_marker_name, with_marker};

// ============================================================================
// CommandSpec - one remote command and the logs it leaves behind
// ============================================================================

/// A log file to archive after the command: where it is on the remote host,
/// and the name to store it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Path on the remote host, relative to the session's home directory
    pub remote_path: String,
    /// Name in the evidence store
    pub evidence_name: String,
}

/// Specification for a remote command.
///
/// The command line is a shell string by nature: it is interpreted by the
/// remote shell, pipes and redirections included. The runner only appends
/// the marker fragment.
///
/// # Example
///
/// ```rust
/// use shellproof_runner::CommandSpec;
///
/// let spec = CommandSpec::new("unzip -o runtime.zip > unzip.log", "zip-rc")
///     .log("unzip.log");
///
/// assert_eq!(spec.wire_command(), "unzip -o runtime.zip > unzip.log;echo zip-rc=$?");
/// assert_eq!(spec.log_files().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    command_line: String,
    marker: String,
    log_files: Vec<LogFile>,
}

impl CommandSpec {
    /// Create a spec for `command_line`, reporting its status as `marker`.
    #[must_use]
    pub fn new(command_line: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            marker: marker.into(),
            log_files: Vec::new(),
        }
    }

    /// Archive `remote_path` as `evidence_name` after the command runs.
    #[must_use]
    pub fn log_file(
        mut self,
        remote_path: impl Into<String>,
        evidence_name: impl Into<String>,
    ) -> Self {
        self.log_files.push(LogFile {
            remote_path: remote_path.into(),
            evidence_name: evidence_name.into(),
        });
        self
    }

    /// Archive `name` under the same name.
    #[must_use]
    pub fn log(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.log_file(name.clone(), name)
    }

    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Logs to archive, in order
    #[must_use]
    pub fn log_files(&self) -> &[LogFile] {
        &self.log_files
    }

    /// The line sent to the session: the command with exactly one marker fragment.
    #[must_use]
    pub fn wire_command(&self) -> String {
        with_marker(&self.command_line, &self.marker)
    }

    /// Check the preconditions `run` relies on.
    pub fn validate(&self) -> Result<(), ExecutionError> {
        validate_marker_name(&self.marker).map_err(ExecutionError::invalid_spec)?;

        if command_body(&self.command_line, &self.marker).trim().is_empty() {
            return Err(ExecutionError::invalid_spec("command line is empty"));
        }

        for log in &self.log_files {
            if log.remote_path.trim().is_empty() {
                return Err(ExecutionError::invalid_spec(format!(
                    "log file for evidence '{}' has an empty remote path",
                    log.evidence_name
                )));
            }
            validate_relative(&log.evidence_name).map_err(|e| {
                ExecutionError::invalid_spec(format!(
                    "evidence name '{}' is not usable: {e}",
                    log.evidence_name
                ))
            })?;
            if in_receipts_dir(&log.evidence_name) {
                return Err(ExecutionError::invalid_spec(format!(
                    "evidence name '{}' is inside '{RECEIPTS_DIR}/', which holds run receipts",
                    log.evidence_name
                )));
            }
        }

        Ok(())
    }
}

fn in_receipts_dir(evidence_name: &str) -> bool {
    Utf8Path::new(evidence_name)
        .components()
        .find(|component| !matches!(component, Utf8Component::CurDir))
        == Some(Utf8Component::Normal(RECEIPTS_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExecutionErrorKind;

    #[test]
    fn test_command_spec_new() {
        let spec = CommandSpec::new("true", "rc");
        assert_eq!(spec.command_line(), "true");
        assert_eq!(spec.marker(), "rc");
        assert!(spec.log_files().is_empty());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_command_spec_logs_keep_order() {
        let spec = CommandSpec::new("mvn -B get > mvn.log", "maven-rc")
            .log("mvn.log")
            .log_file("target/surefire.txt", "surefire.txt");

        assert_eq!(
            spec.log_files(),
            &[
                LogFile {
                    remote_path: "mvn.log".to_string(),
                    evidence_name: "mvn.log".to_string(),
                },
                LogFile {
                    remote_path: "target/surefire.txt".to_string(),
                    evidence_name: "surefire.txt".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_wire_command_scenarios() {
        assert_eq!(CommandSpec::new("false", "rc").wire_command(), "false;echo rc=$?");
        assert_eq!(
            CommandSpec::new("true;echo rc=$?", "rc").wire_command(),
            "true;echo rc=$?"
        );
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        for line in ["", "   ", ";echo rc=$?", " ; "] {
            let err = CommandSpec::new(line, "rc").validate().unwrap_err();
            assert_eq!(err.kind(), ExecutionErrorKind::InvalidSpec, "line {line:?}");
        }
    }

    #[test]
    fn test_validate_rejects_bad_marker() {
        let err = CommandSpec::new("true", "rc=$(id)").validate().unwrap_err();
        assert_eq!(err.kind(), ExecutionErrorKind::InvalidSpec);
    }

    #[test]
    fn test_validate_rejects_escaping_evidence_name() {
        let err = CommandSpec::new("true", "rc")
            .log_file("run.log", "../run.log")
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ExecutionErrorKind::InvalidSpec);

        let err = CommandSpec::new("true", "rc")
            .log_file(" ", "run.log")
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ExecutionErrorKind::InvalidSpec);
    }

    #[test]
    fn test_validate_rejects_evidence_in_receipts_dir() {
        for name in ["receipts/rc.json", "./receipts/rc.json", "receipts/logs/run.log"] {
            let err = CommandSpec::new("true", "rc")
                .log_file("rc.json", name)
                .validate()
                .unwrap_err();
            assert_eq!(err.kind(), ExecutionErrorKind::InvalidSpec, "name {name:?}");
        }

        for name in ["receipts.log", "logs/receipts/run.log", "receipts-old/run.log"] {
            assert!(
                CommandSpec::new("true", "rc")
                    .log_file("run.log", name)
                    .validate()
                    .is_ok(),
                "name {name:?}"
            );
        }
    }
}
