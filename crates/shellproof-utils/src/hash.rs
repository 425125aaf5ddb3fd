//! BLAKE3 content hashing for evidence records

use blake3::Hasher;

/// Hex-encoded BLAKE3 digest of `content`.
#[must_use]
pub fn blake3_hex(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().to_hex().to_string()
}
