use std::time::Duration;

use crate::marker::parse_marker;

/// Outcome of one remote command.
///
/// Created once per run and never mutated afterwards. `succeeded()` is true
/// exactly when the marker was found with value 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    command_line: String,
    marker: String,
    raw_output: String,
    exit_marker_value: Option<i32>,
    copied_logs: Vec<String>,
    elapsed: Duration,
}

impl CommandResult {
    /// Parse the marker out of `raw_output`.
    #[must_use]
    pub fn from_output(
        command_line: impl Into<String>,
        marker: impl Into<String>,
        raw_output: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        let marker = marker.into();
        let raw_output = raw_output.into();
        let exit_marker_value = parse_marker(&raw_output, &marker);
        Self {
            command_line: command_line.into(),
            marker,
            raw_output,
            exit_marker_value,
            copied_logs: Vec::new(),
            elapsed,
        }
    }

    pub(crate) fn record_copied(&mut self, evidence_name: &str) {
        self.copied_logs.push(evidence_name.to_string());
    }

    /// Everything the session returned
    #[must_use]
    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    /// Status echoed under the marker; `None` when the marker never appeared
    #[must_use]
    pub fn exit_marker_value(&self) -> Option<i32> {
        self.exit_marker_value
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_marker_value == Some(0)
    }

    /// Evidence names stored for this run, in spec order
    #[must_use]
    pub fn copied_logs(&self) -> &[String] {
        &self.copied_logs
    }

    /// The line sent to the session, marker fragment included
    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Wall time of the round trip to the session
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
