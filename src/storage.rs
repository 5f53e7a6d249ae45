//! Filesystem access for parameter files.
//!
//! Reads are plain; writes create the parent directory and go through a
//! temporary file in the target directory that is persisted over the
//! destination, so a crash never leaves a partially written file behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ParamsyncError, Result};

/// Whether a file exists at the path.
#[must_use]
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Reads a file to a string.
///
/// # Errors
///
/// Returns an IO error carrying the path.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ParamsyncError::io(path, e))
}

/// Writes file content atomically (write to a sibling temporary file,
/// then rename over the destination), creating parent directories as
/// needed.
///
/// # Errors
///
/// Returns an IO error when the directory cannot be created or the file
/// cannot be written.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            if !parent.is_dir() {
                debug!("Creating directory: {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| ParamsyncError::io(parent, e))?;
            }
            parent
        }
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ParamsyncError::io(dir, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| ParamsyncError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| ParamsyncError::io(path, e.error))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parameters.yml");

        write_atomic(&path, "parameters:\n  a: 1\n").unwrap();
        assert!(exists(&path));
        assert_eq!(read_to_string(&path).unwrap(), "parameters:\n  a: 1\n");
    }

    #[test]
    fn test_write_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app/config/parameters.yml");

        write_atomic(&path, "x").unwrap();
        assert!(exists(&path));
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parameters.yml");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_to_string(&dir.path().join("absent.yml")).unwrap_err();
        assert!(err.to_string().contains("absent.yml"));
    }
}
