//! CLI module for the paramsync tool.
//!
//! This module provides the command-line interface for running
//! reconciliation jobs from a manifest.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::{OutputFormatter, ValidationReport};
