//! Output formatting for CLI commands.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

use crate::processor::RunReport;

use super::commands::OutputFormat;

/// Output formatter for CLI summaries.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Validation summary for display.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Whether every job resolved.
    pub valid: bool,
    /// Number of jobs in the manifest.
    pub jobs: usize,
    /// Resolution errors, one per failing job.
    pub errors: Vec<String>,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a run report for display.
    #[must_use]
    pub fn format_run(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_run_text(report),
        }
    }

    /// Formats a validation report for display.
    #[must_use]
    pub fn format_validation(&self, report: &ValidationReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_validation_text(report),
        }
    }

    fn format_run_text(report: &RunReport) -> String {
        let mut output = String::new();

        for job in &report.processed {
            let action = if job.created { "created" } else { "updated" };
            let _ = writeln!(
                output,
                "{} {} {}{}",
                "✓".green(),
                action,
                job.file.display(),
                if job.prompted > 0 {
                    format!(" ({} value(s) prompted)", job.prompted)
                } else {
                    String::new()
                }
            );
        }

        for error in &report.errors {
            let _ = writeln!(output, "{} {error}", "✗".red());
        }

        if report.success {
            let _ = writeln!(
                output,
                "{} file(s) up to date.",
                report.processed.len()
            );
        } else {
            let _ = writeln!(output, "{}", "Some files could not be processed.".red());
        }
        output
    }

    fn format_validation_text(report: &ValidationReport) -> String {
        if report.valid {
            format!(
                "{} Manifest is valid ({} job(s)).\n",
                "✓".green(),
                report.jobs
            )
        } else {
            let mut output = String::new();
            for error in &report.errors {
                let _ = writeln!(output, "{} {error}", "✗".red());
            }
            let _ = writeln!(output, "{}", "Manifest is invalid.".red());
            output
        }
    }
}
