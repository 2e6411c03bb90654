//! Input source resolution.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default extension of claim extracts discovered in a directory.
pub const DEFAULT_EXTENSION: &str = "csv";

/// Where the raw claim extracts come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    /// Explicit list of files, combined in the given order
    Files(Vec<PathBuf>),
    /// Directory whose matching files are combined (non-recursive)
    Directory(PathBuf),
}

impl InputSource {
    /// Build a source from a single path: a directory is expanded, anything else
    /// is treated as one file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Files(vec![path])
        }
    }

    /// Build a source from several paths. A single directory is expanded.
    pub fn from_paths(mut paths: Vec<PathBuf>) -> Self {
        if paths.len() == 1 {
            Self::from_path(paths.remove(0))
        } else {
            Self::Files(paths)
        }
    }

    /// Resolve the source into the ordered list of files to combine.
    ///
    /// Directory entries are filtered by `extension` (case-sensitive) and
    /// sorted by path so the combined table does not depend on the order the
    /// filesystem happens to list them in.
    pub fn resolve(&self, extension: &str) -> Result<Vec<PathBuf>> {
        let files = match self {
            Self::Files(files) => {
                if let Some(missing) = files.iter().find(|f| !f.exists()) {
                    return Err(DataError::MissingInput(missing.clone()));
                }
                files.clone()
            }
            Self::Directory(dir) => discover(dir, extension)?,
        };

        if files.is_empty() {
            return Err(DataError::NoInputFiles);
        }
        Ok(files)
    }
}

fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(DataError::MissingInput(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
