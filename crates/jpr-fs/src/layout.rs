//! Working-directory layout
//!
//! ```text
//! <working-dir>/
//!   meta/<name>-<version>.meta
//!   jpi/<name>-<version>.jpi
//!   graph/<sha256>.graph
//!   war/jenkins-<version>.war
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result, StoreDir};

/// Resolves cache entry paths under a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The working directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one kind of cache entry.
    pub fn dir(&self, dir: StoreDir) -> PathBuf {
        self.root.join(dir)
    }

    /// Path of a cache entry named `stem` in `dir`.
    pub fn entry(&self, dir: StoreDir, stem: &str) -> PathBuf {
        self.dir(dir).join(format!("{}.{}", stem, dir.extension()))
    }

    /// Create every store directory if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in StoreDir::ALL {
            let path = self.dir(dir);
            fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        }
        Ok(())
    }
}
