//! Manifest handling for the paramsync tool.
//!
//! This module covers everything between the `paramsync.yaml` manifest
//! on disk and a list of fully resolved reconciliation jobs:
//! - Discovering and deserializing the manifest
//! - Applying per-job defaults (dist file, parameter key)
//! - Validating required settings

mod parser;
mod spec;

pub use parser::{ManifestParser, find_manifest};
pub use spec::{ResolvedJob, SyncJob, SyncManifest};
