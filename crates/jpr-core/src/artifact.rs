//! On-disk cache of downloaded plugin archives

use std::path::PathBuf;
use std::sync::Arc;

use jpr_fs::{StoreDir, StoreLayout, io};

use crate::downloader::Downloader;
use crate::plugin::PluginCoordinate;
use crate::Result;

/// Keeps plugin artifacts at `jpi/<name>-<version>.jpi`, downloading on miss.
#[derive(Clone)]
pub struct ArtifactStore {
    layout: StoreLayout,
    downloader: Arc<dyn Downloader>,
}

impl ArtifactStore {
    pub fn new(layout: StoreLayout, downloader: Arc<dyn Downloader>) -> Self {
        Self { layout, downloader }
    }

    pub fn artifact_path(&self, plugin: &PluginCoordinate) -> PathBuf {
        self.layout.entry(StoreDir::Jpi, &plugin.filename())
    }

    /// Path of the cached artifact, downloading it first if needed.
    ///
    /// The download streams into a temp file that only replaces the cache
    /// entry once complete, so an interrupted download leaves no entry.
    pub fn fetch(&self, plugin: &PluginCoordinate) -> Result<PathBuf> {
        let path = self.artifact_path(plugin);
        if io::file_exists(&path)? {
            tracing::debug!(plugin = %plugin, "Artifact already cached");
            return Ok(path);
        }

        tracing::info!(plugin = %plugin, url = %self.downloader.download_url(plugin), "Downloading");

        let mut failure = None;
        let written = io::write_atomic_with(&path, |file| {
            self.downloader.download(plugin, file).map_err(|e| {
                let message = e.to_string();
                failure = Some(e);
                std::io::Error::other(message)
            })
        });
        if let Some(e) = failure {
            return Err(e);
        }
        written?;

        Ok(path)
    }
}
