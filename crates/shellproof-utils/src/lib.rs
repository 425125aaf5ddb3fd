//! Shared building blocks for the shellproof crates

pub mod atomic_write;
pub mod canonicalization;
pub mod error;
pub mod exit_codes;
pub mod hash;
pub mod logging;
pub mod paths;
pub mod types;
