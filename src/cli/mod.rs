//! Command-line interface for chaos-forge.
//!
//! Provides commands for scenario generation, curriculum building and
//! training-format conversion.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands};
