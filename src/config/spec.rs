//! Manifest specification types.
//!
//! These structs map to the `paramsync.yaml` manifest, which lists the
//! reconciliation jobs to run: one entry per managed parameter file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tree::{DEFAULT_PARAMETER_KEY, EnvMap, RenameMap};

/// Suffix appended to the target file to derive the default dist file.
const DIST_SUFFIX: &str = ".dist";

/// The root manifest structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SyncManifest {
    /// Reconciliation jobs, processed in order.
    #[serde(default)]
    pub files: Vec<SyncJob>,
}

/// One reconciliation job, as written in the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SyncJob {
    /// The local file to create or update. Required.
    #[serde(default)]
    pub file: PathBuf,
    /// The template file. Defaults to `file` plus `.dist`.
    #[serde(default)]
    pub dist_file: Option<PathBuf>,
    /// Top-level key under which parameters live. Defaults to
    /// `"parameters"`.
    #[serde(default)]
    pub parameter_key: Option<String>,
    /// Current-to-previous key renames.
    #[serde(default)]
    pub rename_map: RenameMap,
    /// Parameter dot-path to environment variable overrides.
    #[serde(default)]
    pub env_map: EnvMap,
    /// Keep parameters the template no longer declares.
    #[serde(default)]
    pub keep_outdated: bool,
}

/// A job with all defaults applied, ready to process.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJob {
    /// The local file to create or update.
    pub file: PathBuf,
    /// The template file.
    pub dist_file: PathBuf,
    /// Top-level parameter key.
    pub parameter_key: String,
    /// Current-to-previous key renames.
    pub rename_map: RenameMap,
    /// Parameter dot-path to environment variable overrides.
    pub env_map: EnvMap,
    /// Keep parameters the template no longer declares.
    pub keep_outdated: bool,
}

impl SyncJob {
    /// Applies defaults and validates the job.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `file` is missing or the dist file
    /// does not exist on disk.
    pub fn resolve(&self) -> Result<ResolvedJob, ConfigError> {
        if self.file.as_os_str().is_empty() {
            return Err(ConfigError::MissingSetting {
                setting: String::from("file"),
            });
        }

        let dist_file = self.dist_file.clone().unwrap_or_else(|| {
            let mut name = self.file.clone().into_os_string();
            name.push(DIST_SUFFIX);
            PathBuf::from(name)
        });

        if !dist_file.is_file() {
            return Err(ConfigError::DistFileMissing { path: dist_file });
        }

        Ok(ResolvedJob {
            file: self.file.clone(),
            dist_file,
            parameter_key: self
                .parameter_key
                .clone()
                .unwrap_or_else(|| String::from(DEFAULT_PARAMETER_KEY)),
            rename_map: self.rename_map.clone(),
            env_map: self.env_map.clone(),
            keep_outdated: self.keep_outdated,
        })
    }
}
