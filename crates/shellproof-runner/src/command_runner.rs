use camino::Utf8Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use shellproof_evidence::{EvidenceRecord, EvidenceStore, RunReceipt};
use shellproof_utils::logging::command_span;

use crate::{
    CommandResult, CommandSpec, EvidenceFailure, ExecutionError, RemoteFileSystem, RemoteSession,
};

/// Runs marker-wrapped commands and archives their logs.
///
/// Holds no state between calls: each [`run`](Self::run) is one remote
/// command and produces an independent [`CommandResult`].
pub struct CommandRunner<'a> {
    evidence: &'a dyn EvidenceStore,
    write_receipts: bool,
}

impl<'a> CommandRunner<'a> {
    /// Runner archiving into `evidence`, without receipts.
    #[must_use]
    pub fn new(evidence: &'a dyn EvidenceStore) -> Self {
        Self {
            evidence,
            write_receipts: false,
        }
    }

    /// Also store a [`RunReceipt`] per command under `receipts/<marker>.json`.
    #[must_use]
    pub fn with_receipts(mut self, enabled: bool) -> Self {
        self.write_receipts = enabled;
        self
    }

    /// Send `spec` to `session`, read the marker back and copy the spec's
    /// log files from `files` into the evidence store.
    ///
    /// A non-zero or missing marker is reported through
    /// [`CommandResult::succeeded`], not as an error. Logs are copied in
    /// order and the first one that cannot be read or stored aborts the run
    /// with [`ExecutionError::EvidenceCopyFailed`].
    pub fn run(
        &self,
        session: &mut dyn RemoteSession,
        files: &dyn RemoteFileSystem,
        spec: &CommandSpec,
    ) -> Result<CommandResult, ExecutionError> {
        spec.validate()?;

        let span = command_span(spec.marker());
        let _enter = span.enter();

        let wire = spec.wire_command();
        let target = session.describe();
        debug!(session = %target, command = %wire, "Issuing remote command");

        let started = Instant::now();
        let output = session.issue_command(&wire).map_err(|e| {
            error!(session = %target, error = %e, "Remote session rejected command");
            ExecutionError::from(e)
        })?;
        let elapsed = started.elapsed();

        let mut result = CommandResult::from_output(&wire, spec.marker(), output, elapsed);
        match result.exit_marker_value() {
            Some(exit_marker) => info!(
                exit_marker,
                elapsed_ms = elapsed_ms(&result),
                succeeded = result.succeeded(),
                "Remote command completed"
            ),
            None => warn!(
                elapsed_ms = elapsed_ms(&result),
                "Marker not found in output; treating command as failed"
            ),
        }

        let mut records = Vec::with_capacity(spec.log_files().len());
        for log in spec.log_files() {
            match self.copy_log(files, &log.remote_path, &log.evidence_name) {
                Ok(record) => {
                    debug!(
                        remote = %log.remote_path,
                        evidence = %record.name,
                        size_bytes = record.size_bytes,
                        "Archived log"
                    );
                    result.record_copied(&record.name);
                    records.push(record);
                }
                Err(failure) => {
                    error!(remote = %log.remote_path, error = %failure, "Evidence copy failed");
                    let err = ExecutionError::EvidenceCopyFailed {
                        path: log.remote_path.clone(),
                        failure,
                        result: Box::new(result),
                    };
                    if let Some(partial) = err.result() {
                        self.write_receipt(partial, &records, Some(&err));
                    }
                    return Err(err);
                }
            }
        }

        self.write_receipt(&result, &records, None);
        Ok(result)
    }

    fn copy_log(
        &self,
        files: &dyn RemoteFileSystem,
        remote_path: &str,
        evidence_name: &str,
    ) -> Result<EvidenceRecord, EvidenceFailure> {
        let content = files
            .read(Utf8Path::new(remote_path))
            .map_err(EvidenceFailure::RemoteRead)?;
        Ok(self.evidence.store(evidence_name, &content)?)
    }

    // Receipts are a convenience record; failing to write one never changes
    // the outcome of the run.
    fn write_receipt(
        &self,
        result: &CommandResult,
        records: &[EvidenceRecord],
        err: Option<&ExecutionError>,
    ) {
        if !self.write_receipts {
            return;
        }

        let mut receipt = RunReceipt::new(
            result.marker(),
            result.command_line(),
            result.exit_marker_value(),
            elapsed_ms(result),
            records,
        );
        if let Some(err) = err {
            receipt = receipt.with_error_kind(err.kind().as_ref());
        }

        if let Err(e) = receipt.write_to(self.evidence) {
            warn!(error = %e, "Failed to write run receipt");
        }
    }
}

fn elapsed_ms(result: &CommandResult) -> u64 {
    u64::try_from(result.elapsed().as_millis()).unwrap_or(u64::MAX)
}
