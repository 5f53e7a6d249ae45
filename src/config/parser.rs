//! Manifest discovery and loading.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::storage;

use super::spec::SyncManifest;

/// Manifest file names probed during discovery, in order.
const MANIFEST_NAMES: &[&str] = &["paramsync.yaml", "paramsync.yml"];

/// Searches for a manifest in the given directory and its ancestors.
#[must_use]
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        for name in MANIFEST_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                debug!("Found manifest: {}", candidate.display());
                return Some(candidate);
            }
        }
    }
    None
}

/// Loader for the `paramsync.yaml` manifest.
#[derive(Debug, Default)]
pub struct ManifestParser;

impl ManifestParser {
    /// Creates a new manifest parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a manifest from a file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing or cannot be parsed.
    pub fn load_file(&self, path: &Path) -> Result<SyncManifest> {
        info!("Loading manifest from: {}", path.display());

        if !path.is_file() {
            return Err(ConfigError::ManifestNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = storage::read_to_string(path)?;
        self.parse_yaml(&content, Some(path))
    }

    /// Parses a manifest from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<SyncManifest> {
        let manifest: SyncManifest = serde_yaml::from_str(content).map_err(|e| {
            ConfigError::ManifestInvalid {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            }
        })?;

        debug!("Manifest lists {} file(s)", manifest.files.len());
        Ok(manifest)
    }
}
