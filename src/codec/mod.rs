//! File format codecs.
//!
//! Each supported on-disk format is handled by a [`FileCodec`]: YAML,
//! JSON (reflowed through the [`pretty`] printer), line-oriented dotenv
//! files, and PHP source-literal files. Codec selection is driven by the
//! target file's extension.
//!
//! The [`inline`] module carries the scalar codec used for environment
//! variables and interactive answers; it is a leaf dependency of the
//! reconciliation engine, not a file format.

pub mod inline;
pub mod pretty;

mod dotenv;
mod json;
mod php;
mod yaml;

use std::path::Path;

pub use self::dotenv::DotenvCodec;
pub use self::json::JsonCodec;
pub use self::php::PhpCodec;
pub use self::yaml::YamlCodec;

use crate::error::{ConfigError, ParseError};
use crate::tree::ParameterNode;

/// Fixed banner line prefixed to generated files, in formats that
/// support comments. It is a comment in every such format, so re-parsing
/// a generated file ignores it.
pub const AUTO_GENERATION_BANNER: &str =
    "# This file is auto-generated during the build. Do not edit it manually.";

/// A parser/serializer pair for one on-disk parameter file format.
pub trait FileCodec: Sync {
    /// Human-readable format name used in error messages.
    fn name(&self) -> &'static str;

    /// Parses source text into a parameter tree.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the source text is malformed.
    fn parse(&self, source: &str) -> Result<ParameterNode, ParseError>;

    /// Serializes a parameter document to file content, banner included
    /// where the format supports comments.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the document cannot be represented
    /// in this format.
    fn dump(&self, doc: &ParameterNode) -> Result<String, ParseError>;

    /// Whether this codec handles the given lowercase file extension.
    fn supports(&self, extension: &str) -> bool;
}

/// The codec registry, in selection order.
static CODECS: &[&(dyn FileCodec)] = &[&YamlCodec, &JsonCodec, &DotenvCodec, &PhpCodec];

/// Selects the codec for a file path by its extension.
///
/// Files named `.env` (with or without a further suffix such as
/// `.env.local`) select the dotenv codec regardless of extension.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedFormat`] when no codec supports the
/// extension.
pub fn codec_for(path: &Path) -> Result<&'static dyn FileCodec, ConfigError> {
    let ext = effective_extension(path);
    CODECS
        .iter()
        .find(|codec| codec.supports(&ext))
        .copied()
        .ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
}

/// Extension used for codec selection, lowercased.
fn effective_extension(path: &Path) -> String {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if name == ".env" || name.starts_with(".env.") {
            return String::from("env");
        }
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_for(path: &str) -> Option<&'static str> {
        codec_for(Path::new(path)).ok().map(FileCodec::name)
    }

    #[test]
    fn test_codec_selection_by_extension() {
        assert_eq!(name_for("p.yml"), Some("YAML"));
        assert_eq!(name_for("p.yaml"), Some("YAML"));
        assert_eq!(name_for("p.json"), Some("JSON"));
        assert_eq!(name_for("p.env"), Some("dotenv"));
        assert_eq!(name_for("p.php"), Some("PHP"));
    }

    #[test]
    fn test_dotenv_dotfile_names() {
        assert_eq!(name_for(".env"), Some("dotenv"));
        assert_eq!(name_for("config/.env.local"), Some("dotenv"));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        assert!(matches!(
            codec_for(Path::new("p.toml")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_dist_extension_matches_inner_format() {
        // `.dist` defaults come from appending to the real file name, so
        // selection for "parameters.yml.dist" happens on the inner
        // extension after the caller strips ".dist".
        assert_eq!(effective_extension(Path::new("parameters.yml")), "yml");
    }
}
