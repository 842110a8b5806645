//! Plugin metadata cache
//!
//! Each plugin version's manifest is parsed once and kept as JSON at
//! `meta/<name>-<version>.meta`. A cached entry is authoritative: it is read
//! back without touching the artifact store or the network.

use std::path::PathBuf;
use std::sync::Arc;

use jpr_fs::{ConfigStore, StoreDir, StoreLayout, io};

use crate::archive::Archive;
use crate::artifact::ArtifactStore;
use crate::downloader::Downloader;
use crate::manifest::parse_plugin_manifest;
use crate::plugin::{PluginCoordinate, PluginMetadata};
use crate::Result;

#[derive(Clone)]
pub struct MetadataStore {
    layout: StoreLayout,
    artifacts: ArtifactStore,
    documents: ConfigStore,
}

impl MetadataStore {
    pub fn new(layout: StoreLayout, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            artifacts: ArtifactStore::new(layout.clone(), downloader),
            layout,
            documents: ConfigStore::new(),
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn path(&self, plugin: &PluginCoordinate) -> PathBuf {
        self.layout.entry(StoreDir::Meta, &plugin.filename())
    }

    pub fn is_cached(&self, plugin: &PluginCoordinate) -> Result<bool> {
        Ok(io::file_exists(&self.path(plugin))?)
    }

    /// Metadata for `plugin`, fetching and parsing its artifact on a miss.
    pub fn get_metadata(&self, plugin: &PluginCoordinate) -> Result<PluginMetadata> {
        self.load_or_fetch(plugin)
            .map_err(|e| e.for_plugin(plugin.identifier()))
    }

    /// Metadata already in the cache. Never downloads.
    pub fn read_cached(&self, plugin: &PluginCoordinate) -> Result<PluginMetadata> {
        self.documents
            .load(&self.path(plugin))
            .map_err(|e| crate::Error::from(e).for_plugin(plugin.identifier()))
    }

    fn load_or_fetch(&self, plugin: &PluginCoordinate) -> Result<PluginMetadata> {
        let path = self.path(plugin);
        if io::file_exists(&path)? {
            tracing::debug!(plugin = %plugin, "Metadata cache hit");
            return Ok(self.documents.load(&path)?);
        }

        let artifact = self.artifacts.fetch(plugin)?;
        let manifest = Archive::open(&artifact)?.read_manifest()?;
        let metadata = parse_plugin_manifest(&manifest)?;

        self.documents.save(&path, &metadata)?;
        tracing::debug!("{}", metadata.describe());
        Ok(metadata)
    }
}
