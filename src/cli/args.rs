//! CLI argument definitions and parsing structures

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use shellproof_config::SessionKind;

/// shellproof - run shell commands on a remote host and keep the evidence
#[derive(Parser, Debug)]
#[command(name = "shellproof")]
#[command(about = "Run remote shell commands with exit-status markers and archive their logs")]
#[command(long_about = r#"
shellproof sends a command line to a shell session with a trailing
`;echo <marker>=$?`, reads the exit status back from the output, and copies
the log files the command produced into an evidence directory.

EXAMPLES:
  # Run a command on the local machine and archive its log
  shellproof run --marker make-rc --log check.log -- 'make check > check.log'

  # Run over ssh and print the result as JSON
  shellproof --session ssh --host linux-primary run --marker rc --json -- uname -a

  # Fetch, unpack and run the core IVT
  shellproof --session ssh --host linux-primary smoke --repository https://repo.example.org/maven

  # Show the effective configuration and where each value comes from
  shellproof config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > environment > config file > defaults
  Config file is discovered by searching upward from CWD for .shellproof/config.toml
  Use --config to specify an explicit config file path

EXIT CODES:
  0 success, 1 internal error, 2 invalid arguments or configuration,
  3 remote command failed or reported no marker, 4 session unavailable,
  5 evidence could not be archived
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory evidence is archived into
    #[arg(long, global = true)]
    pub evidence_dir: Option<Utf8PathBuf>,

    /// Do not write JSON receipts next to the evidence
    #[arg(long, global = true)]
    pub no_receipts: bool,

    /// Session provider: local or ssh
    #[arg(long, global = true)]
    pub session: Option<SessionKind>,

    /// Remote host (ssh sessions)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Remote user (ssh sessions)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Remote port (ssh sessions)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Private key file (ssh sessions)
    #[arg(long, global = true)]
    pub identity_file: Option<Utf8PathBuf>,

    /// Home directory on the session host; relative log paths resolve against it
    #[arg(long, global = true)]
    pub home: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one command line and archive its logs
    Run {
        /// Marker name the exit status is echoed under
        #[arg(long)]
        marker: String,

        /// Log file to archive, as REMOTE or REMOTE:EVIDENCE_NAME (repeatable)
        #[arg(long = "log", value_name = "REMOTE[:EVIDENCE]")]
        logs: Vec<String>,

        /// Print the result as canonical JSON
        #[arg(long)]
        json: bool,

        /// The command line, after `--`. One argument is a shell string;
        /// several are quoted word by word.
        #[arg(last = true, required = true, num_args = 1..)]
        command: Vec<String>,
    },

    /// Fetch, unpack and run the runtime smoke test
    Smoke {
        /// Maven repository holding the runtime
        #[arg(long)]
        repository: Option<String>,

        /// Runtime version to fetch
        #[arg(long = "version", id = "runtime_version")]
        runtime_version: Option<String>,

        /// Print the step report as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration with value sources
    Config {
        /// Print as canonical JSON
        #[arg(long)]
        json: bool,
    },
}
