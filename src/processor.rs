//! Per-file processing and the build hook entry point.
//!
//! A [`FileProcessor`] runs one reconciliation job end to end: load the
//! template and the existing file through their codecs, hand both trees
//! to the engine, serialize the outcome and write it atomically. The
//! batch runner processes manifest jobs in order and aborts on the first
//! failure unless told to keep going.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::codec::{self, FileCodec};
use crate::config::SyncJob;
use crate::console::Console;
use crate::error::{ConfigError, Result};
use crate::reconciler::{EnvSource, ReconcilePolicy, Reconciler};
use crate::storage;
use crate::tree::ParameterNode;

/// Outcome of one processed job.
#[derive(Debug, Serialize)]
pub struct JobReport {
    /// The file that was written.
    pub file: PathBuf,
    /// Whether the file was created rather than updated.
    pub created: bool,
    /// Number of values prompted from the user.
    pub prompted: usize,
}

/// Outcome of a whole run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Whether every job succeeded.
    pub success: bool,
    /// Reports for the jobs that completed.
    pub processed: Vec<JobReport>,
    /// Errors collected when running with `keep_going`.
    pub errors: Vec<String>,
}

/// Processes reconciliation jobs against the filesystem.
pub struct FileProcessor<'a> {
    /// Interactive transport, shared with the engine.
    console: &'a dyn Console,
    /// Environment variable source, shared with the engine.
    env: &'a dyn EnvSource,
}

impl<'a> FileProcessor<'a> {
    /// Creates a processor.
    #[must_use]
    pub const fn new(console: &'a dyn Console, env: &'a dyn EnvSource) -> Self {
        Self { console, env }
    }

    /// Runs manifest jobs in order.
    ///
    /// By default the first failing job aborts the run. With
    /// `keep_going`, failures are collected and the remaining jobs still
    /// run; the report then carries `success = false`.
    ///
    /// # Errors
    ///
    /// Returns the first job error unless `keep_going` is set.
    pub fn process_all(&self, jobs: &[SyncJob], keep_going: bool) -> Result<RunReport> {
        let mut processed = Vec::with_capacity(jobs.len());
        let mut errors = Vec::new();

        for job in jobs {
            match self.process_job(job) {
                Ok(report) => processed.push(report),
                Err(err) if keep_going => {
                    error!("Job for \"{}\" failed: {err}", job.file.display());
                    errors.push(format!("{}: {err}", job.file.display()));
                }
                Err(err) => return Err(err),
            }
        }

        Ok(RunReport {
            success: errors.is_empty(),
            processed,
            errors,
        })
    }

    /// Runs a single job end to end.
    ///
    /// # Errors
    ///
    /// Returns a configuration, parse, format or IO error; the target
    /// file is only written after reconciliation fully succeeds.
    pub fn process_job(&self, job: &SyncJob) -> Result<JobReport> {
        let job = job.resolve()?;
        debug!(
            "Processing \"{}\" from \"{}\"",
            job.file.display(),
            job.dist_file.display()
        );

        let target_codec = codec::codec_for(&job.file)?;
        let dist_codec = dist_codec(&job.dist_file, &job.file)?;

        let exists = storage::exists(&job.file);
        let action = if exists { "Updating" } else { "Creating" };
        self.console.write(&format!(
            "{} the \"{}\" file",
            action.green(),
            job.file.display()
        ));

        let dist_source = storage::read_to_string(&job.dist_file)?;
        let template = dist_codec
            .parse(&dist_source)
            .map_err(|e| e.with_path(&job.dist_file))?;

        let existing = if exists {
            let source = storage::read_to_string(&job.file)?;
            let parsed = target_codec
                .parse(&source)
                .map_err(|e| e.with_path(&job.file))?;
            // An empty file parses to null and counts as an empty mapping.
            Some(match parsed {
                ParameterNode::Null => ParameterNode::empty_map(),
                other => other,
            })
        } else {
            None
        };

        let policy = ReconcilePolicy {
            keep_outdated: job.keep_outdated,
            interactive: self.console.is_interactive(),
        };
        let outcome = Reconciler::new(policy, self.console, self.env)
            .with_parameter_key(&job.parameter_key)
            .with_rename_map(job.rename_map.clone())
            .with_env_map(job.env_map.clone())
            .with_paths(&job.dist_file, &job.file)
            .reconcile(&template, existing.as_ref())?;

        let content = target_codec.dump(&outcome.document)?;
        storage::write_atomic(&job.file, &content)?;

        info!(
            "{} \"{}\" ({} prompted)",
            if exists { "Updated" } else { "Created" },
            job.file.display(),
            outcome.prompts.len()
        );

        Ok(JobReport {
            file: job.file,
            created: !exists,
            prompted: outcome.prompts.len(),
        })
    }
}

/// Selects the codec for the dist file.
///
/// A `.dist` suffix is stripped first, so `parameters.yml.dist` uses the
/// YAML codec; when the dist extension is unknown, the target file's
/// codec is used.
fn dist_codec(
    dist_file: &Path,
    target_file: &Path,
) -> std::result::Result<&'static dyn FileCodec, ConfigError> {
    let effective = if dist_file.extension().is_some_and(|e| e == "dist") {
        dist_file.with_extension("")
    } else {
        dist_file.to_path_buf()
    };

    codec::codec_for(&effective).or_else(|_| codec::codec_for(target_file))
}
