//! Configuration for shellproof
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > environment > file > defaults. The TOML file lives at
//! `.shellproof/config.toml` and has `[session]`, `[evidence]` and `[runtime]`
//! sections. Every resolved key remembers where it came from.

mod builder;
mod cli_args;
mod discovery;
mod error;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use error::ConfigError;
pub use model::*;
pub use shellproof_utils::types::ConfigSource;
