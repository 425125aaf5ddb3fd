use camino::Utf8PathBuf;

use crate::EvidenceError;

/// One stored piece of evidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRecord {
    /// Name the evidence was stored under
    pub name: String,
    /// Location on disk, for stores backed by a filesystem
    pub path: Option<Utf8PathBuf>,
    /// Number of bytes stored
    pub size_bytes: u64,
    /// BLAKE3 hash of the stored bytes
    pub blake3: String,
    /// Whether an earlier entry with the same name was replaced
    pub replaced_existing: bool,
}

/// Write-only sink for run evidence, keyed by name.
///
/// Names are relative paths. Storing a name twice replaces the earlier
/// content; implementations report that through
/// [`EvidenceRecord::replaced_existing`] so callers can warn about it.
pub trait EvidenceStore {
    /// Store `content` under `name`.
    fn store(&self, name: &str, content: &[u8]) -> Result<EvidenceRecord, EvidenceError>;

    /// Human-readable description of where evidence goes, for logs.
    fn describe(&self) -> String;
}

impl<T: EvidenceStore + ?Sized> EvidenceStore for &T {
    fn store(&self, name: &str, content: &[u8]) -> Result<EvidenceRecord, EvidenceError> {
        (**self).store(name, content)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
