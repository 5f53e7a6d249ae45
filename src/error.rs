//! Error types for the paramsync parameter handler.
//!
//! This module provides the error hierarchy for all operations in the
//! reconciliation lifecycle: job configuration, file parsing, merging,
//! and writing the result.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the paramsync parameter handler.
#[derive(Debug, Error)]
pub enum ParamsyncError {
    /// Job or manifest configuration errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Structural errors in a parameter document.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Malformed source text in a codec.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Filesystem errors.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path of the file or directory involved.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Interactive prompt failure.
    #[error("Prompt error: {message}")]
    Prompt {
        /// Description of the prompt failure.
        message: String,
    },
}

/// Job or manifest configuration errors. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The manifest file was not found.
    #[error("Manifest file not found: {path}")]
    ManifestNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// The manifest could not be deserialized.
    #[error("Failed to parse manifest: {message}")]
    ManifestInvalid {
        /// Description of the parse failure.
        message: String,
        /// Source location, if known.
        location: Option<String>,
    },

    /// A required job setting is missing or empty.
    #[error("The \"{setting}\" setting is required to use this handler")]
    MissingSetting {
        /// Name of the missing setting.
        setting: String,
    },

    /// The dist (template) file does not exist.
    #[error("The dist file \"{path}\" does not exist. Check your dist-file config or create it")]
    DistFileMissing {
        /// Path of the missing dist file.
        path: PathBuf,
    },

    /// The template document has no entry under the parameter key.
    #[error("The top-level key \"{key}\" is missing in \"{path}\"")]
    ParameterKeyMissing {
        /// The configured parameter key.
        key: String,
        /// Path of the template file.
        path: PathBuf,
    },

    /// No codec supports the file extension.
    #[error("Unsupported file format for \"{path}\"")]
    UnsupportedFormat {
        /// Path whose extension was not recognized.
        path: PathBuf,
    },
}

/// Structural errors in a parameter document. Always fatal.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The existing file parses to something that is not a mapping.
    #[error("The existing \"{path}\" file does not contain a mapping")]
    NotAMapping {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// The template file parses to something that is not a mapping.
    #[error("The dist file \"{path}\" does not contain a mapping")]
    DistNotAMapping {
        /// Path of the offending file.
        path: PathBuf,
    },
}

/// Malformed source text in a codec. Always fatal.
#[derive(Debug, Error)]
#[error("Failed to parse {format} content{}: {message}", path_suffix(.path))]
pub struct ParseError {
    /// Name of the format being parsed.
    pub format: &'static str,
    /// Path of the file being parsed, if any.
    pub path: Option<PathBuf>,
    /// Underlying parse detail.
    pub message: String,
}

impl ParseError {
    /// Creates a parse error without file context.
    #[must_use]
    pub fn new(format: &'static str, message: impl Into<String>) -> Self {
        Self {
            format,
            path: None,
            message: message.into(),
        }
    }

    /// Attaches the path of the file being parsed.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in \"{}\"", p.display()))
        .unwrap_or_default()
}

impl ParamsyncError {
    /// Wraps an IO error with the path it occurred on.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a prompt error.
    #[must_use]
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt {
            message: message.into(),
        }
    }
}

/// Result type alias using [`ParamsyncError`].
pub type Result<T> = std::result::Result<T, ParamsyncError>;
