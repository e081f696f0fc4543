//! Temporary storage for split slide files.
//!
//! Storage hands out writable paths and never deletes anything; whoever
//! receives the produced files owns their cleanup.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::path::PathBuf;

/// Allocates named files for extracted slides.
pub trait TempStorage {
    /// Create (or truncate) a file called `name` and return its path.
    fn allocate(&self, name: &str) -> Result<PathBuf>;
}

/// Stores files directly in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    /// Store files in `root`, creating it on first allocation.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store files in the system temp directory.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl Default for DirectoryStorage {
    fn default() -> Self {
        Self::system()
    }
}

impl TempStorage for DirectoryStorage {
    fn allocate(&self, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|source| Error::Storage {
            path: self.root.clone(),
            source,
        })?;

        let path = self.root.join(name);
        File::create(&path).map_err(|source| Error::Storage {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}
