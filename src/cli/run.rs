//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, initialises logging, discovers configuration,
//! dispatches to a command and handles all error output.

use clap::Parser;

use shellproof_config::{CliArgs, Config};
use shellproof_utils::error::UserFriendlyError;
use shellproof_utils::exit_codes::ExitCode;
use shellproof_utils::logging::init_tracing;

use super::args::{Cli, Commands};
use super::commands;
use crate::ShellproofError;

/// Main CLI execution function.
///
/// Handles ALL output including errors and returns the exit code to use on
/// failure. main.rs only calls `std::process::exit` with it.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: logging could not be initialised: {e}");
    }

    let mut cli_args = CliArgs {
        config_path: cli.config.clone(),
        session_kind: cli.session,
        host: cli.host.clone(),
        user: cli.user.clone(),
        port: cli.port,
        identity_file: cli.identity_file.clone(),
        home: cli.home.clone(),
        evidence_dir: cli.evidence_dir.clone(),
        no_receipts: cli.no_receipts,
        ..CliArgs::default()
    };
    if let Commands::Smoke {
        repository,
        runtime_version,
        ..
    } = &cli.command
    {
        cli_args.maven_repository = repository.clone();
        cli_args.runtime_version = runtime_version.clone();
    }

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = ShellproofError::from(err);
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    let result = match cli.command {
        Commands::Run {
            marker,
            logs,
            json,
            command,
        } => commands::execute_run_command(&config, &marker, &logs, json, &command),
        Commands::Smoke { json, .. } => commands::execute_smoke_command(&config, json),
        Commands::Config { json } => commands::execute_config_command(&config, json),
    };

    if let Err(error) = result {
        if let Some(err) = error.downcast_ref::<ShellproofError>() {
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }

        eprintln!("✗ Unexpected error: {error:#}");
        eprintln!("\n  Run with --verbose for more detailed output");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}
