//! Constants and enums for working-directory store paths.

use std::path::Path;

/// Subdirectories of the resolver working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreDir {
    /// Parsed plugin metadata (`<name>-<version>.meta`)
    Meta,
    /// Downloaded plugin artifacts (`<name>-<version>.jpi`)
    Jpi,
    /// Dependency graphs keyed by input hash (`<sha256>.graph`)
    Graph,
    /// Parsed base distributions (`jenkins-<version>.war`)
    War,
}

impl StoreDir {
    /// Every store directory, in creation order.
    pub const ALL: [StoreDir; 4] = [Self::Meta, Self::Jpi, Self::Graph, Self::War];

    /// Get the string representation of the directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Jpi => "jpi",
            Self::Graph => "graph",
            Self::War => "war",
        }
    }

    /// File extension of the entries kept in this directory (same as its name).
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl AsRef<Path> for StoreDir {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for StoreDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
