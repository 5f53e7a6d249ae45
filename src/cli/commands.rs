//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// paramsync - keeps local parameter files in sync with their templates.
#[derive(Parser, Debug)]
#[command(name = "paramsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the manifest file.
    #[arg(short, long, global = true, env = "PARAMSYNC_MANIFEST")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile every file listed in the manifest.
    Sync {
        /// Never prompt; fill missing parameters from template defaults.
        #[arg(short = 'n', long)]
        non_interactive: bool,

        /// Continue with the remaining files when one fails.
        #[arg(long)]
        keep_going: bool,
    },

    /// Validate the manifest and its job settings.
    Validate,

    /// Write a starter manifest and dist file.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::parse_from(["paramsync", "sync", "-n", "--keep-going"]);
        match cli.command {
            Commands::Sync {
                non_interactive,
                keep_going,
            } => {
                assert!(non_interactive);
                assert!(keep_going);
            }
            _ => panic!("expected sync command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["paramsync", "--config", "custom.yaml", "validate"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    }
}
