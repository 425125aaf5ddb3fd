//! Evidence stores and run receipts
//!
//! An evidence store is a write-only sink keyed by name. Logs copied off a
//! remote host and the JSON receipt describing each command land here so
//! they can be inspected after the run.

mod dir;
mod error;
mod memory;
mod receipt;
mod store;

pub use dir::DirEvidenceStore;
pub use error::EvidenceError;
pub use memory::MemoryEvidenceStore;
pub use receipt::{RECEIPT_SCHEMA_VERSION, RECEIPTS_DIR, RunReceipt, emit_receipt_jcs, receipt_name};
pub use store::{EvidenceRecord, EvidenceStore};
