use proptest::prelude::*;
use shellproof::{CommandRunner, CommandSpec};
use shellproof_evidence::MemoryEvidenceStore;
use shellproof_runner::test_support::{MemoryFileSystem, ScriptedSession};

proptest! {
    /// The status comes from the marker line no matter what output precedes it
    #[test]
    fn prop_status_read_from_marker_line(
        noise in "[^=]{0,200}",
        status in 0i32..=255,
    ) {
        let evidence = MemoryEvidenceStore::new();
        let files = MemoryFileSystem::new("/home/ivt");
        let mut session = ScriptedSession::new().respond(format!("{noise}\nrc={status}\n"));

        let result = CommandRunner::new(&evidence)
            .run(&mut session, &files, &CommandSpec::new("./build.sh", "rc"))
            .unwrap();

        prop_assert_eq!(result.exit_marker_value(), Some(status));
        prop_assert_eq!(result.succeeded(), status == 0);
    }

    /// Marker text printed mid-line after the status line, as a child process's
    /// stderr might, does not replace the status
    #[test]
    fn prop_trailing_marker_text_keeps_real_status(
        noise in "[a-zA-Z .:]{1,60}",
        status in 1i32..=255,
    ) {
        let evidence = MemoryEvidenceStore::new();
        let files = MemoryFileSystem::new("/home/ivt");
        let mut session = ScriptedSession::new()
            .respond(format!("rc={status}\n{noise} rc=0\n"));

        let result = CommandRunner::new(&evidence)
            .run(&mut session, &files, &CommandSpec::new("./build.sh", "rc"))
            .unwrap();

        prop_assert_eq!(result.exit_marker_value(), Some(status));
        prop_assert!(!result.succeeded());
    }

    /// Output without the marker never counts as success
    #[test]
    fn prop_missing_marker_is_not_success(noise in "[^=]{0,200}") {
        let evidence = MemoryEvidenceStore::new();
        let files = MemoryFileSystem::new("/home/ivt");
        let mut session = ScriptedSession::new().respond(noise);

        let result = CommandRunner::new(&evidence)
            .run(&mut session, &files, &CommandSpec::new("./build.sh", "rc"))
            .unwrap();

        prop_assert_eq!(result.exit_marker_value(), None);
        prop_assert!(!result.succeeded());
    }

    /// Exactly one marker fragment is sent, whether or not the caller wrote one
    #[test]
    fn prop_one_marker_fragment_on_the_wire(
        body in "[a-z][a-z0-9 ./>-]{0,40}",
        marker in "[a-z][a-z0-9_-]{0,12}",
        caller_appended in any::<bool>(),
    ) {
        let fragment = format!(";echo {marker}=$?");
        let line = if caller_appended {
            format!("{body}{fragment}")
        } else {
            body.clone()
        };

        let evidence = MemoryEvidenceStore::new();
        let files = MemoryFileSystem::new("/home/ivt");
        let mut session = ScriptedSession::new().respond(format!("{marker}=0\n"));

        CommandRunner::new(&evidence)
            .run(&mut session, &files, &CommandSpec::new(line, marker.clone()))
            .unwrap();

        let sent = &session.sent()[0];
        prop_assert!(sent.ends_with(&fragment));
        prop_assert_eq!(sent.matches(&fragment).count(), 1);
    }

    /// A log's bytes are archived unchanged, CR/LF and all
    #[test]
    fn prop_log_bytes_archived_verbatim(content in proptest::collection::vec(any::<u8>(), 0..512)) {
        let evidence = MemoryEvidenceStore::new();
        let files = MemoryFileSystem::new("/home/ivt").with_file("run.log", &content);
        let mut session = ScriptedSession::new().respond("rc=3\n");

        let spec = CommandSpec::new("./build.sh > run.log", "rc").log("run.log");
        let result = CommandRunner::new(&evidence)
            .run(&mut session, &files, &spec)
            .unwrap();

        prop_assert_eq!(result.copied_logs().len(), 1);
        prop_assert_eq!(evidence.get("run.log"), Some(content));
    }
}
