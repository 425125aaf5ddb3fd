use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shellproof_utils::canonicalization::emit_jcs;
use shellproof_utils::types::FileHash;

use crate::{EvidenceError, EvidenceRecord, EvidenceStore};

/// Current receipt schema version
pub const RECEIPT_SCHEMA_VERSION: &str = "1";

/// JSON record of one remote command and the evidence it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReceipt {
    pub schema_version: String,
    pub emitted_at: DateTime<Utc>,
    /// Marker name the command echoed its status under
    pub marker: String,
    /// Command line exactly as sent to the session
    pub command_line: String,
    /// Parsed marker value; absent when the marker never appeared
    pub exit_marker_value: Option<i32>,
    pub succeeded: bool,
    pub elapsed_ms: u64,
    /// Archived logs, sorted by name for stable diffs
    pub evidence: Vec<FileHash>,
    /// Error kind when the run ended in an execution error
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_kind: Option<String>,
}

impl RunReceipt {
    /// Build a receipt stamped with the current time.
    #[must_use]
    pub fn new(
        marker: &str,
        command_line: &str,
        exit_marker_value: Option<i32>,
        elapsed_ms: u64,
        evidence: &[EvidenceRecord],
    ) -> Self {
        let mut hashes: Vec<FileHash> = evidence
            .iter()
            .map(|record| FileHash {
                path: record.name.clone(),
                blake3: record.blake3.clone(),
                size_bytes: record.size_bytes,
            })
            .collect();
        hashes.sort_by(|a, b| a.path.cmp(&b.path));

        Self {
            schema_version: RECEIPT_SCHEMA_VERSION.to_string(),
            emitted_at: Utc::now(),
            marker: marker.to_string(),
            command_line: command_line.to_string(),
            exit_marker_value,
            succeeded: exit_marker_value == Some(0),
            elapsed_ms,
            evidence: hashes,
            error_kind: None,
        }
    }

    #[must_use]
    pub fn with_error_kind(mut self, kind: impl Into<String>) -> Self {
        self.error_kind = Some(kind.into());
        self
    }

    /// Store this receipt as canonical JSON under [`receipt_name`].
    pub fn write_to(&self, store: &dyn EvidenceStore) -> Result<EvidenceRecord, EvidenceError> {
        let json = emit_receipt_jcs(self)?;
        store.store(&receipt_name(&self.marker), json.as_bytes())
    }
}

/// Evidence directory receipts live in; log evidence may not use it.
pub const RECEIPTS_DIR: &str = "receipts";

/// Evidence name receipts are stored under: `receipts/<marker>.json`
#[must_use]
pub fn receipt_name(marker: &str) -> String {
    format!("{RECEIPTS_DIR}/{marker}.json")
}

/// Emit receipt JSON using JCS canonicalization (RFC 8785).
pub fn emit_receipt_jcs(receipt: &RunReceipt) -> Result<String, EvidenceError> {
    emit_jcs(receipt).map_err(|e| EvidenceError::ReceiptSerialization {
        reason: format!("{e:#}"),
    })
}
