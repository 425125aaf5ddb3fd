//! Canonical JSON output (JCS, RFC 8785)

use anyhow::{Context, Result};
use serde::Serialize;

/// Emit `value` as canonical JSON: sorted keys, no insignificant whitespace.
///
/// Used for every JSON document the CLI prints so that output is stable
/// across runs and diffs cleanly.
pub fn emit_jcs<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).with_context(|| "Failed to serialize value to JSON")?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .with_context(|| "Failed to canonicalize JSON using JCS")?;
    String::from_utf8(json_bytes).with_context(|| "JCS output contained invalid UTF-8")
}
