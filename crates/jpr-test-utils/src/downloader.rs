//! [`MemoryDownloader`]: a [`Downloader`] serving archives from memory.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use jpr_core::{Downloader, Error, PluginCoordinate, Result};

use crate::archive::plugin_archive;

/// Serves registered plugin archives and records every download.
///
/// Unknown coordinates fail like a missing update center entry.
#[derive(Default)]
pub struct MemoryDownloader {
    artifacts: HashMap<String, Vec<u8>>,
    delay: Option<Duration>,
    downloads: Mutex<Vec<String>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl MemoryDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin built by [`plugin_archive`].
    pub fn with_plugin(self, name: &str, version: &str, dependencies: &str) -> Self {
        let bytes = plugin_archive(name, version, dependencies);
        self.with_artifact(name, version, bytes)
    }

    /// Register arbitrary bytes as the artifact of `name:version`.
    pub fn with_artifact(mut self, name: &str, version: &str, bytes: Vec<u8>) -> Self {
        self.artifacts
            .insert(PluginCoordinate::new(name, version).identifier(), bytes);
        self
    }

    /// Make every download take at least `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Identifiers of every download attempt, in call order.
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    /// Largest number of downloads that were running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Downloader for MemoryDownloader {
    fn download_url(&self, plugin: &PluginCoordinate) -> String {
        format!(
            "memory://plugins/{}/{}/{}.hpi",
            plugin.name, plugin.version, plugin.name
        )
    }

    fn download(&self, plugin: &PluginCoordinate, sink: &mut dyn Write) -> Result<()> {
        self.downloads.lock().unwrap().push(plugin.identifier());
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let outcome = match self.artifacts.get(&plugin.identifier()) {
            Some(bytes) => sink.write_all(bytes).map_err(|e| Error::Download {
                url: self.download_url(plugin),
                reason: e.to_string(),
            }),
            None => Err(Error::Download {
                url: self.download_url(plugin),
                reason: "HTTP 404".into(),
            }),
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
