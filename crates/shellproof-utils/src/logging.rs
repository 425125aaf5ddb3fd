//! Tracing setup and structured log helpers
//!
//! Library crates only emit `tracing` events; the CLI installs the subscriber
//! once through [`init_tracing`].

use std::time::Duration;
use tracing::{Level, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise verbose mode logs shellproof crates at
/// debug and includes targets and span close events; the default is a
/// compact info-level format.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("shellproof=debug,shellproof_runner=debug,shellproof_evidence=debug,info")
            } else {
                EnvFilter::try_new("shellproof=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span wrapping one remote command round trip.
pub fn command_span(marker: &str) -> tracing::Span {
    span!(Level::INFO, "remote_command", marker = %marker)
}

/// Span wrapping one scenario step.
pub fn step_span(step: &str) -> tracing::Span {
    span!(Level::INFO, "scenario_step", step = %step)
}

/// Log that a step finished, with whole seconds as in the run logs users compare against.
pub fn log_step_complete(step: &str, elapsed: Duration, succeeded: bool) {
    info!(
        step = %step,
        elapsed_secs = elapsed.as_secs(),
        succeeded,
        "Step completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_can_be_entered_without_subscriber() {
        let span = command_span("maven-rc");
        let _guard = span.enter();
        log_step_complete("fetch_runtime", Duration::from_secs(3), true);
    }

    #[test]
    fn test_init_tracing_twice_reports_error_instead_of_panicking() {
        let _ = init_tracing(false);
        assert!(init_tracing(true).is_err());
    }
}
