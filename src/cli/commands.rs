//! Command implementations

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::Serialize;
use std::collections::BTreeMap;

use shellproof_config::Config;
use shellproof_evidence::DirEvidenceStore;
use shellproof_runner::{CommandResult, CommandSpec};

use crate::context::{OpenSession, TestContext};
use crate::scenario::{RuntimeSmokeTest, ScenarioReport};
use crate::{ShellproofError, emit_jcs};

/// JSON shape of `shellproof run --json`
#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    marker: &'a str,
    command_line: &'a str,
    exit_marker_value: Option<i32>,
    succeeded: bool,
    copied_logs: &'a [String],
    elapsed_ms: u64,
    raw_output: &'a str,
}

impl<'a> From<&'a CommandResult> for RunOutput<'a> {
    fn from(result: &'a CommandResult) -> Self {
        Self {
            marker: result.marker(),
            command_line: result.command_line(),
            exit_marker_value: result.exit_marker_value(),
            succeeded: result.succeeded(),
            copied_logs: result.copied_logs(),
            elapsed_ms: u64::try_from(result.elapsed().as_millis()).unwrap_or(u64::MAX),
            raw_output: result.raw_output(),
        }
    }
}

/// `REMOTE` or `REMOTE:EVIDENCE`; the evidence name defaults to the file name.
pub(crate) fn parse_log_arg(arg: &str) -> (String, String) {
    match arg.split_once(':') {
        Some((remote, evidence)) if !evidence.is_empty() => {
            (remote.to_string(), evidence.to_string())
        }
        Some((remote, _)) => (remote.to_string(), default_evidence_name(remote)),
        None => (arg.to_string(), default_evidence_name(arg)),
    }
}

fn default_evidence_name(remote: &str) -> String {
    Utf8Path::new(remote)
        .file_name()
        .unwrap_or(remote)
        .to_string()
}

/// A single argument is taken as a shell string as-is; several arguments
/// are quoted so each reaches the remote shell as one word.
pub(crate) fn command_line(args: &[String]) -> String {
    match args {
        [single] => single.clone(),
        _ => shell_words::join(args),
    }
}

fn open_store(config: &Config) -> DirEvidenceStore {
    DirEvidenceStore::new(config.evidence_root())
}

pub fn execute_run_command(
    config: &Config,
    marker: &str,
    logs: &[String],
    json: bool,
    command: &[String],
) -> Result<()> {
    let mut spec = CommandSpec::new(command_line(command), marker);
    for log in logs {
        let (remote, evidence) = parse_log_arg(log);
        spec = spec.log_file(remote, evidence);
    }

    let evidence = open_store(config);
    let mut session = OpenSession::open(config).map_err(ShellproofError::from)?;
    let (session, files) = session.parts();
    let mut ctx = TestContext::new(session, files, &evidence, config);

    let result = match ctx.run(&spec) {
        Ok(result) => result,
        Err(err) => {
            if let Some(partial) = err.result() {
                print_run_result(partial, json)?;
            }
            return Err(ShellproofError::from(err).into());
        }
    };

    print_run_result(&result, json)?;

    if result.succeeded() {
        Ok(())
    } else {
        Err(ShellproofError::CommandFailed {
            marker: marker.to_string(),
            exit_marker: result.exit_marker_value(),
        }
        .into())
    }
}

fn print_run_result(result: &CommandResult, json: bool) -> Result<()> {
    if json {
        let out = emit_jcs(&RunOutput::from(result)).context("Failed to emit run JSON")?;
        println!("{out}");
        return Ok(());
    }

    print!("{}", result.raw_output());
    if !result.raw_output().is_empty() && !result.raw_output().ends_with('\n') {
        println!();
    }
    let status = result
        .exit_marker_value()
        .map_or_else(|| "missing".to_string(), |v| v.to_string());
    println!(
        "{} {}={} ({} ms)",
        if result.succeeded() { "✓" } else { "✗" },
        result.marker(),
        status,
        result.elapsed().as_millis()
    );
    for log in result.copied_logs() {
        println!("  archived {log}");
    }
    Ok(())
}

/// JSON shape of one step in `shellproof smoke --json`
#[derive(Debug, Serialize)]
struct StepJson<'a> {
    name: &'a str,
    succeeded: bool,
    elapsed_secs: u64,
    exit_marker_value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn report_json(report: &ScenarioReport) -> Vec<StepJson<'_>> {
    report
        .steps
        .iter()
        .map(|step| StepJson {
            name: step.name,
            succeeded: step.succeeded(),
            elapsed_secs: step.elapsed.as_secs(),
            exit_marker_value: match &step.result {
                Ok(Some(result)) => result.exit_marker_value(),
                _ => None,
            },
            error: step.result.as_ref().err().map(ToString::to_string),
        })
        .collect()
}

pub fn execute_smoke_command(config: &Config, json: bool) -> Result<()> {
    let evidence = open_store(config);
    let mut session = OpenSession::open(config).map_err(ShellproofError::from)?;
    let (session, files) = session.parts();
    let ctx = TestContext::new(session, files, &evidence, config);

    let mut smoke = RuntimeSmokeTest::new(ctx).map_err(ShellproofError::from)?;
    let mut report = smoke.run_all();

    if json {
        let out = emit_jcs(&report_json(&report)).context("Failed to emit smoke JSON")?;
        println!("{out}");
    } else {
        for step in &report.steps {
            println!(
                "{} {} ({}s)",
                if step.succeeded() { "✓" } else { "✗" },
                step.name,
                step.elapsed.as_secs()
            );
        }
        println!("Evidence: {}", evidence.root());
    }

    // run_all stops at the first failure, so only the last step can hold one
    if let Some(err) = report.steps.pop().and_then(|step| step.result.err()) {
        return Err(ShellproofError::from(err).into());
    }
    Ok(())
}

pub fn execute_config_command(config: &Config, json: bool) -> Result<()> {
    let effective = config.effective_config();

    if json {
        let map: BTreeMap<&str, BTreeMap<&str, &str>> = effective
            .iter()
            .map(|(key, (value, source))| {
                (
                    key.as_str(),
                    BTreeMap::from([("value", value.as_str()), ("source", source.as_str())]),
                )
            })
            .collect();
        println!("{}", emit_jcs(&map).context("Failed to emit config JSON")?);
        return Ok(());
    }

    let width = effective.keys().map(String::len).max().unwrap_or(0);
    for (key, (value, source)) in &effective {
        println!("{key:width$}  {value}  ({source})");
    }
    Ok(())
}
