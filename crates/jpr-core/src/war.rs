//! Base distribution (Jenkins WAR) reader
//!
//! The WAR ships "detached" plugins under `WEB-INF/detached-plugins/`, each
//! a nested plugin archive. Reading them means inflating every nested
//! archive, so the parsed result is cached at `war/jenkins-<version>.war`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use jpr_fs::{ConfigStore, StoreDir, StoreLayout, io};

use crate::archive::Archive;
use crate::manifest::{Manifest, parse_plugin_manifest};
use crate::plugin::{PluginCoordinate, PluginMetadata, Requester};
use crate::{Error, Result};

pub const JENKINS_VERSION: &str = "Jenkins-Version";

/// Where the WAR keeps its bundled plugins.
pub const DETACHED_PLUGINS_DIR: &str = "WEB-INF/detached-plugins/";

/// A Jenkins release and the plugins it bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDistribution {
    pub version: String,
    #[serde(default)]
    pub plugins: Vec<PluginMetadata>,
}

impl BaseDistribution {
    /// Read a WAR, using the parsed copy in the working directory if present.
    pub fn read(war: &Path, layout: &StoreLayout) -> Result<Self> {
        let mut archive = Archive::open(war)?;
        let manifest = Manifest::parse(&archive.read_manifest()?);
        let version = manifest.require(JENKINS_VERSION)?.to_string();

        let documents = ConfigStore::new();
        let cache = layout.entry(StoreDir::War, &format!("jenkins-{version}"));
        if io::file_exists(&cache)? {
            tracing::debug!(version = %version, "Base distribution cache hit");
            return Ok(documents.load(&cache)?);
        }

        tracing::info!(war = %war.display(), version = %version, "Reading base distribution");
        let distribution = Self {
            plugins: read_detached_plugins(&mut archive, &manifest)?,
            version,
        };
        documents.save(&cache, &distribution)?;
        Ok(distribution)
    }

    /// The bundled plugins as coordinates requested by the WAR, sorted by name.
    pub fn bundled_coordinates(&self) -> Vec<PluginCoordinate> {
        let mut coordinates: Vec<PluginCoordinate> = self
            .plugins
            .iter()
            .map(|metadata| metadata.plugin.clone().with_requester(Requester::War))
            .collect();
        coordinates.sort_by(|a, b| a.name.cmp(&b.name));
        coordinates
    }
}

/// Entries of the detached plugins directory.
///
/// Taken from the manifest's `Name:` sections, or from the archive listing
/// when the manifest has none.
fn detached_entries<R: std::io::Read + std::io::Seek>(
    archive: &Archive<R>,
    manifest: &Manifest,
) -> Vec<String> {
    let listed: Vec<String> = manifest
        .get_all("Name")
        .filter(|name| name.starts_with(DETACHED_PLUGINS_DIR))
        .map(str::to_string)
        .collect();
    if !listed.is_empty() {
        return listed;
    }

    archive
        .entry_names()
        .into_iter()
        .filter(|name| {
            name.starts_with(DETACHED_PLUGINS_DIR)
                && (name.ends_with(".hpi") || name.ends_with(".jpi"))
        })
        .collect()
}

fn read_detached_plugins<R: std::io::Read + std::io::Seek>(
    archive: &mut Archive<R>,
    manifest: &Manifest,
) -> Result<Vec<PluginMetadata>> {
    let mut plugins = Vec::new();
    let mut errors = Vec::new();

    for entry in detached_entries(archive, manifest) {
        let parsed = archive
            .read_entry(&entry)
            .and_then(|bytes| Archive::from_bytes(archive.label().join(&entry), bytes))
            .and_then(|mut nested| nested.read_manifest())
            .and_then(|text| parse_plugin_manifest(&text));
        match parsed {
            Ok(metadata) => plugins.push(metadata),
            Err(e) => errors.push(e.for_plugin(&entry)),
        }
    }

    Error::from_batch(errors)?;
    plugins.sort_by(|a, b| a.plugin.name.cmp(&b.plugin.name));
    Ok(plugins)
}
