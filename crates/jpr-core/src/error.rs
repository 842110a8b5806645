//! Error types for jpr-core

use std::path::PathBuf;

/// Result type for jpr-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the resolution pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A version string matched none of the known schemes.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Two versions could not be ordered.
    #[error("unable to compare versions '{candidate}' and '{incumbent}': {}", .failures.join("; "))]
    VersionComparison {
        candidate: String,
        incumbent: String,
        failures: Vec<String>,
    },

    /// An artifact could not be retrieved.
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    /// The file is not a readable zip archive.
    #[error("invalid archive {path}: {reason}")]
    InvalidArchive { path: PathBuf, reason: String },

    /// The archive does not contain a required entry.
    #[error("{entry} not found in {path}")]
    MissingEntry { path: PathBuf, entry: String },

    /// A manifest lacks a required field.
    #[error("manifest is missing required field '{field}'")]
    MissingManifestField { field: String },

    /// A `Plugin-Dependencies` entry does not match `name:version[;options]`.
    #[error("malformed dependency entry '{entry}'")]
    MalformedDependency { entry: String },

    /// A requested plugin has no entry in the lock.
    #[error("{plugin} is missing from the locked plugins")]
    MissingLockEntry { plugin: String },

    /// The dependency graph loops back on itself.
    #[error("dependency cycle detected: {path}")]
    DependencyCycle { path: String },

    /// The overall resolution deadline expired.
    #[error("resolution did not finish within {seconds}s")]
    Timeout { seconds: u64 },

    /// A fetch worker died without reporting.
    #[error("worker failed: {0}")]
    Worker(String),

    /// An error annotated with the plugin it concerns.
    #[error("{plugin}: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: Box<Error>,
    },

    /// Several independent failures.
    #[error("{} errors occurred:{}", .0.len(), format_batch(.0))]
    Batch(Vec<Error>),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Fs(#[from] jpr_fs::Error),
}

fn format_batch(errors: &[Error]) -> String {
    errors.iter().map(|e| format!("\n  - {e}")).collect()
}

impl Error {
    /// Annotate this error with the plugin being processed.
    pub fn for_plugin(self, plugin: impl std::fmt::Display) -> Self {
        Self::Plugin {
            plugin: plugin.to_string(),
            source: Box::new(self),
        }
    }

    /// Fold collected failures into one result.
    ///
    /// No errors is success, a single error is returned as is and anything
    /// more becomes [`Error::Batch`].
    pub fn from_batch(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Batch(errors)),
        }
    }

    /// Every leaf error, flattening batches.
    pub fn leaves(&self) -> Vec<&Error> {
        match self {
            Self::Batch(errors) => errors.iter().flat_map(Error::leaves).collect(),
            other => vec![other],
        }
    }

    /// Whether the error (or its annotated cause) is a missing cache entry.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Fs(e) => e.is_not_found(),
            Self::Plugin { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
