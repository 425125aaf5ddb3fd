//! The marker convention: `<command>;echo <marker>=$?`
//!
//! The remote shell's exit status travels back as plain text. The sent line
//! always ends with exactly one marker fragment, and the status is read back
//! from the last line that starts with `<marker>=<digits>`. Trailing
//! whitespace is tolerated. When no such line exists, a marker glued to the
//! end of unterminated output (`foorc=0`) still counts. A `<marker>=<digits>`
//! in the middle of a line (`child rc=0`) never does, and an output without
//! the marker parses to `None`, never to an error.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").unwrap());

/// Check that `marker` can be echoed unquoted and matched literally.
pub fn validate_marker_name(marker: &str) -> Result<(), String> {
    if marker.is_empty() {
        return Err("marker name is empty".to_string());
    }
    if !MARKER_NAME.is_match(marker) {
        return Err(format!(
            "marker name '{marker}' may only contain letters, digits, '_', '-' and '.'"
        ));
    }
    Ok(())
}

/// The `echo` that emits the marker, without the separator.
#[must_use]
pub fn marker_echo(marker: &str) -> String {
    format!("echo {marker}=$?")
}

/// The fragment appended to command lines: `;echo <marker>=$?`
#[must_use]
pub fn marker_fragment(marker: &str) -> String {
    format!(";{}", marker_echo(marker))
}

/// Whether `command_line` already ends in `;echo <marker>=$?` (spaces around
/// the `;` allowed).
#[must_use]
pub fn has_marker_fragment(command_line: &str, marker: &str) -> bool {
    command_line
        .trim_end()
        .strip_suffix(&marker_echo(marker))
        .is_some_and(|prefix| prefix.trim_end().ends_with(';'))
}

/// The command with any trailing marker fragment and separators removed.
#[must_use]
pub fn command_body<'a>(command_line: &'a str, marker: &str) -> &'a str {
    let trimmed = command_line.trim_end();
    let without_marker = if has_marker_fragment(trimmed, marker) {
        trimmed
            .strip_suffix(&marker_echo(marker))
            .unwrap_or(trimmed)
            .trim_end()
    } else {
        trimmed
    };
    without_marker.trim_end_matches([';', ' ', '\t'])
}

/// Append the marker fragment unless the line already carries it.
///
/// A trailing `;` is reused rather than doubled, and a trailing background
/// `&` gets a `:` no-op so the result stays valid `sh` (`cmd & :;echo m=$?`).
#[must_use]
pub fn with_marker(command_line: &str, marker: &str) -> String {
    let trimmed = command_line.trim_end();
    if has_marker_fragment(trimmed, marker) {
        return trimmed.to_string();
    }

    if trimmed.ends_with(';') && !trimmed.ends_with(";;") {
        format!("{trimmed}{}", marker_echo(marker))
    } else if trimmed.ends_with('&') && !trimmed.ends_with("&&") {
        format!("{trimmed} :{}", marker_fragment(marker))
    } else {
        format!("{trimmed}{}", marker_fragment(marker))
    }
}

/// Exit status carried by the last marker line in `output`.
#[must_use]
pub fn parse_marker(output: &str, marker: &str) -> Option<i32> {
    let escaped = regex::escape(marker);
    let on_own_line = Regex::new(&format!(r"(?m)^{escaped}=(\d+)[ \t\r]*$")).ok()?;
    let glued_at_end = Regex::new(&format!(r"\S{escaped}=(\d+)\s*\z")).ok()?;

    on_own_line
        .captures_iter(output)
        .last()
        .or_else(|| glued_at_end.captures(output))
        .and_then(|caps| caps.get(1))
        .and_then(|value| value.as_str().parse::<i32>().ok())
}
