use std::collections::BTreeMap;
use std::sync::Mutex;

use shellproof_utils::hash::blake3_hex;
use shellproof_utils::paths::validate_relative;

use crate::{EvidenceError, EvidenceRecord, EvidenceStore};

/// In-memory evidence store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryEvidenceStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryEvidenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content stored under `name`, if any
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().get(name).cloned()
    }

    /// Stored names in lexical order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EvidenceStore for MemoryEvidenceStore {
    fn store(&self, name: &str, content: &[u8]) -> Result<EvidenceRecord, EvidenceError> {
        validate_relative(name).map_err(|source| EvidenceError::InvalidName {
            name: name.to_string(),
            source,
        })?;

        let replaced_existing = self
            .lock()
            .insert(name.to_string(), content.to_vec())
            .is_some();

        Ok(EvidenceRecord {
            name: name.to_string(),
            path: None,
            size_bytes: content.len() as u64,
            blake3: blake3_hex(content),
            replaced_existing,
        })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
