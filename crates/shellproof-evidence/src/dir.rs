use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use shellproof_utils::atomic_write::write_bytes_atomic;
use shellproof_utils::hash::blake3_hex;
use shellproof_utils::paths::validate_relative;

use crate::{EvidenceError, EvidenceRecord, EvidenceStore};

/// Evidence store rooted at a local directory.
///
/// Each name maps to `<root>/<name>`, written atomically. Re-using a name
/// within a run overwrites the earlier file and logs a warning.
#[derive(Debug, Clone)]
pub struct DirEvidenceStore {
    root: Utf8PathBuf,
}

impl DirEvidenceStore {
    /// Create a store rooted at `root`. The directory is created lazily on first write.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path a given evidence name resolves to, after validation.
    pub fn path_for(&self, name: &str) -> Result<Utf8PathBuf, EvidenceError> {
        validate_relative(name).map_err(|source| EvidenceError::InvalidName {
            name: name.to_string(),
            source,
        })?;
        Ok(self.root.join(name))
    }
}

impl EvidenceStore for DirEvidenceStore {
    fn store(&self, name: &str, content: &[u8]) -> Result<EvidenceRecord, EvidenceError> {
        let path = self.path_for(name)?;

        let result =
            write_bytes_atomic(&path, content).map_err(|e| EvidenceError::WriteFailed {
                path: path.to_string(),
                reason: format!("{e:#}"),
            })?;

        if result.replaced_existing {
            warn!(evidence = %name, path = %path, "Evidence name reused; earlier file overwritten");
        }
        for warning in &result.warnings {
            warn!(evidence = %name, "{warning}");
        }
        debug!(evidence = %name, bytes = content.len(), "Stored evidence");

        Ok(EvidenceRecord {
            name: name.to_string(),
            path: Some(path),
            size_bytes: content.len() as u64,
            blake3: blake3_hex(content),
            replaced_existing: result.replaced_existing,
        })
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> DirEvidenceStore {
        DirEvidenceStore::new(Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap())
    }

    #[test]
    fn test_store_writes_file_under_root() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let record = store.store("mvn.log", b"[INFO] BUILD SUCCESS\n").unwrap();

        assert_eq!(record.name, "mvn.log");
        assert_eq!(record.size_bytes, 21);
        assert!(!record.replaced_existing);
        let path = record.path.unwrap();
        assert_eq!(path, store.root().join("mvn.log"));
        assert_eq!(std::fs::read(&path).unwrap(), b"[INFO] BUILD SUCCESS\n");
    }

    #[test]
    fn test_store_nested_name_creates_directories() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let record = store.store("receipts/zip-rc.json", b"{}").unwrap();

        assert!(record.path.unwrap().exists());
    }

    #[test]
    fn test_store_same_name_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        store.store("coreivt.log", b"attempt 1").unwrap();
        let second = store.store("coreivt.log", b"attempt 2").unwrap();

        assert!(second.replaced_existing);
        assert_eq!(
            std::fs::read(store.root().join("coreivt.log")).unwrap(),
            b"attempt 2"
        );
    }

    #[test]
    fn test_store_rejects_escaping_names() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let err = store.store("../escape.log", b"x").unwrap_err();
        assert!(matches!(err, EvidenceError::InvalidName { .. }));

        let err = store.store("/tmp/abs.log", b"x").unwrap_err();
        assert!(matches!(err, EvidenceError::InvalidName { .. }));
    }

    #[test]
    fn test_describe_names_root() {
        let store = DirEvidenceStore::new("target/evidence");
        assert_eq!(store.describe(), "dir:target/evidence");
    }
}
