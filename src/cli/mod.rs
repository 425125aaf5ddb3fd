//! Command-line interface for shellproof
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point and dispatch
//! - `commands`: command implementations

pub mod args;
mod commands;
mod run;

pub use args::{Cli, Commands};
pub use run::run;
