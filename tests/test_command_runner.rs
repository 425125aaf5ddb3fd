//! End-to-end tests for the command runner through the public API
//!
//! Scripted sessions cover the marker protocol and evidence rules; the local
//! shell tests run real commands under `sh` and archive into a temp dir.

use camino::Utf8PathBuf;
use shellproof::{CommandRunner, CommandSpec, ExecutionError, ExecutionErrorKind};
use shellproof_evidence::{DirEvidenceStore, MemoryEvidenceStore, RunReceipt, receipt_name};
use shellproof_runner::test_support::{MemoryFileSystem, ScriptedSession};
use tempfile::TempDir;

fn utf8(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
}

#[test]
fn test_false_reports_failure_without_error() {
    let evidence = MemoryEvidenceStore::new();
    let files = MemoryFileSystem::new("/home/ivt");
    let mut session = ScriptedSession::new().respond("rc=1\n");

    let result = CommandRunner::new(&evidence)
        .run(&mut session, &files, &CommandSpec::new("false", "rc"))
        .unwrap();

    assert_eq!(session.sent(), ["false;echo rc=$?"]);
    assert_eq!(result.exit_marker_value(), Some(1));
    assert!(!result.succeeded());
    assert!(evidence.is_empty());
}

#[test]
fn test_marker_is_appended_once() {
    let evidence = MemoryEvidenceStore::new();
    let files = MemoryFileSystem::new("/home/ivt");
    let mut session = ScriptedSession::new().respond("maven-rc=0\n");

    let spec = CommandSpec::new("mvn -B verify > mvn.log;echo maven-rc=$?", "maven-rc");
    CommandRunner::new(&evidence)
        .run(&mut session, &files, &spec)
        .unwrap();

    assert_eq!(session.sent(), ["mvn -B verify > mvn.log;echo maven-rc=$?"]);
}

#[test]
fn test_logs_are_archived_after_failed_command() {
    let evidence = MemoryEvidenceStore::new();
    let files = MemoryFileSystem::new("/home/ivt")
        .with_file("unzip.log", b"End-of-central-directory signature not found\n");
    let mut session = ScriptedSession::new().respond("zip-rc=9\n");

    let spec = CommandSpec::new("unzip -o runtime.zip > unzip.log", "zip-rc").log("unzip.log");
    let result = CommandRunner::new(&evidence)
        .run(&mut session, &files, &spec)
        .unwrap();

    assert_eq!(result.exit_marker_value(), Some(9));
    assert_eq!(result.copied_logs(), ["unzip.log"]);
    assert_eq!(
        evidence.get("unzip.log").unwrap(),
        b"End-of-central-directory signature not found\n"
    );
}

#[test]
fn test_missing_log_carries_the_command_result() {
    let evidence = MemoryEvidenceStore::new();
    let files = MemoryFileSystem::new("/home/ivt").with_file("first.log", b"one");
    let mut session = ScriptedSession::new().respond("rc=0\n");

    let spec = CommandSpec::new("./two-step.sh", "rc")
        .log("first.log")
        .log("second.log");
    let err = CommandRunner::new(&evidence)
        .run(&mut session, &files, &spec)
        .unwrap_err();

    assert_eq!(err.kind(), ExecutionErrorKind::EvidenceCopyFailed);
    let result = err.result().unwrap();
    assert!(result.succeeded());
    assert_eq!(result.copied_logs(), ["first.log"]);
    assert_eq!(evidence.names(), ["first.log"]);
}

#[test]
fn test_failed_copy_still_writes_receipt_with_error_kind() {
    let evidence = MemoryEvidenceStore::new();
    let files = MemoryFileSystem::new("/home/ivt");
    let mut session = ScriptedSession::new().respond("rc=0\n");

    let spec = CommandSpec::new("true", "rc").log("never-written.log");
    let err = CommandRunner::new(&evidence)
        .with_receipts(true)
        .run(&mut session, &files, &spec)
        .unwrap_err();
    assert!(matches!(err, ExecutionError::EvidenceCopyFailed { .. }));

    let receipt: RunReceipt =
        serde_json::from_slice(&evidence.get(&receipt_name("rc")).unwrap()).unwrap();
    assert_eq!(receipt.error_kind.as_deref(), Some("EvidenceCopyFailed"));
    assert_eq!(receipt.exit_marker_value, Some(0));
    assert!(receipt.evidence.is_empty());
}

#[test]
fn test_dead_session_is_session_unavailable() {
    let evidence = MemoryEvidenceStore::new();
    let files = MemoryFileSystem::new("/home/ivt");
    let mut session = ScriptedSession::new().fail("connection reset by peer");

    let err = CommandRunner::new(&evidence)
        .run(&mut session, &files, &CommandSpec::new("true", "rc").log("run.log"))
        .unwrap_err();

    assert_eq!(err.kind(), ExecutionErrorKind::SessionUnavailable);
    assert!(err.result().is_none());
    assert!(evidence.is_empty());
}

#[test]
fn test_invalid_spec_sends_nothing() {
    let evidence = MemoryEvidenceStore::new();
    let files = MemoryFileSystem::new("/home/ivt");
    let mut session = ScriptedSession::new().respond("rc=0\n");

    let err = CommandRunner::new(&evidence)
        .run(&mut session, &files, &CommandSpec::new("true", "not a marker"))
        .unwrap_err();

    assert_eq!(err.kind(), ExecutionErrorKind::InvalidSpec);
    assert!(session.sent().is_empty());
}

#[cfg(unix)]
mod local_shell {
    use super::*;
    use shellproof::RemoteSession;
    use shellproof_runner::LocalShellSession;
    use std::fs;

    #[test]
    fn test_true_and_false_under_sh() {
        let home = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        let evidence = DirEvidenceStore::new(utf8(&store));
        let mut session = LocalShellSession::new(utf8(&home));
        let files = session.files();
        let runner = CommandRunner::new(&evidence);

        let ok = runner
            .run(&mut session, &files, &CommandSpec::new("true", "rc"))
            .unwrap();
        let failed = runner
            .run(&mut session, &files, &CommandSpec::new("false", "rc"))
            .unwrap();

        assert!(ok.succeeded());
        assert_eq!(failed.exit_marker_value(), Some(1));
        assert!(!failed.succeeded());
    }

    #[test]
    fn test_marker_text_on_stderr_cannot_turn_failure_into_success() {
        let home = TempDir::new().unwrap();
        let evidence = MemoryEvidenceStore::new();
        let mut session = LocalShellSession::new(utf8(&home));
        let files = session.files();

        let spec = CommandSpec::new("echo 'child rc=0' >&2; false", "rc");
        let result = CommandRunner::new(&evidence)
            .run(&mut session, &files, &spec)
            .unwrap();

        assert_eq!(result.raw_output(), "child rc=0\nrc=1\n");
        assert_eq!(result.exit_marker_value(), Some(1));
        assert!(!result.succeeded());
    }

    #[test]
    fn test_run_log_lands_in_evidence_dir_with_receipt() {
        let home = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        let evidence = DirEvidenceStore::new(utf8(&store));
        let mut session = LocalShellSession::new(utf8(&home));
        let files = session.files();

        let spec = CommandSpec::new("echo hello > run.log", "rc").log("run.log");
        let result = CommandRunner::new(&evidence)
            .with_receipts(true)
            .run(&mut session, &files, &spec)
            .unwrap();

        assert!(result.succeeded());
        assert_eq!(
            fs::read_to_string(store.path().join("run.log")).unwrap(),
            "hello\n"
        );

        let receipt: RunReceipt = serde_json::from_str(
            &fs::read_to_string(store.path().join("receipts").join("rc.json")).unwrap(),
        )
        .unwrap();
        assert!(receipt.succeeded);
        assert_eq!(receipt.evidence.len(), 1);
        assert_eq!(receipt.evidence[0].path, "run.log");
        assert_eq!(receipt.evidence[0].size_bytes, 6);
    }

    #[test]
    fn test_exit_status_of_last_pipeline_wins() {
        let home = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        let evidence = DirEvidenceStore::new(utf8(&store));
        let mut session = LocalShellSession::new(utf8(&home));
        let files = session.files();

        // Output that happens to contain the marker text does not fool the parser
        let spec = CommandSpec::new("echo rc=0; exit_with() { return 7; }; exit_with", "rc");
        let result = CommandRunner::new(&evidence)
            .run(&mut session, &files, &spec)
            .unwrap();

        assert_eq!(result.exit_marker_value(), Some(7));
        assert!(session.describe().starts_with("local"));
    }
}
