// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![forbid(unsafe_code)]               // Unsafe code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![warn(missing_docs)]                // All public items should be documented
#![warn(unreachable_pub)]             // Unreachable pub items should shrink

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning

// ============================================================================
// Crate Documentation
// ============================================================================

//! # paramsync
//!
//! Keeps a developer-owned parameter file in sync with the versioned
//! template (dist) file shipped with the project.
//!
//! ## Overview
//!
//! On each build, paramsync reads the template and the local file and
//! produces a new local file that:
//!
//! - Contains every parameter the template declares
//! - Preserves values the developer already supplied
//! - Drops parameters the template no longer declares
//! - Lets environment variables and interactive prompts supply missing
//!   values
//! - Tolerates parameter renames across template revisions
//!
//! ## Architecture
//!
//! The core is a pure reconciliation engine; file formats, the
//! filesystem and the interactive transport are collaborators injected
//! at the edges:
//!
//! 1. **Manifest**: `paramsync.yaml` lists the files to manage
//! 2. **Codecs**: YAML, JSON, dotenv and PHP source-literal formats
//! 3. **Engine**: merges the template tree with the existing tree
//!
//! ## Modules
//!
//! - [`tree`]: the format-agnostic parameter tree
//! - [`codec`]: file codecs, the inline scalar codec, the JSON printer
//! - [`reconciler`]: the reconciliation engine
//! - [`processor`]: per-file orchestration and the batch runner
//! - [`config`]: manifest loading and job resolution
//! - [`console`]: the interactive transport
//! - [`storage`]: atomic file access
//! - [`cli`]: command-line interface
//!
//! ## Example manifest
//!
//! ```yaml
//! files:
//!   - file: app/config/parameters.yml
//!     env-map:
//!       database.password: APP_DB_PASSWORD
//!     rename-map:
//!       database.host: db_host
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod codec;
pub mod config;
pub mod console;
pub mod error;
pub mod processor;
pub mod reconciler;
pub mod storage;
pub mod tree;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormat, OutputFormatter};
pub use codec::{FileCodec, codec_for};
pub use config::{ManifestParser, ResolvedJob, SyncJob, SyncManifest, find_manifest};
pub use console::{Console, TerminalConsole};
pub use error::{ConfigError, FormatError, ParamsyncError, ParseError, Result};
pub use processor::{FileProcessor, JobReport, RunReport};
pub use reconciler::{EnvSource, ReconcileOutcome, ReconcilePolicy, Reconciler, SystemEnv};
pub use tree::{EnvMap, ParameterMap, ParameterNode, RenameMap};
