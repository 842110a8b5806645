//! Concurrent metadata fetching
//!
//! Walks the dependency closure of a plugin set one level at a time. Each
//! level runs on the worker pool and the dependencies it discovers form the
//! next level, so every plugin version is fetched at most once.

use std::collections::HashSet;
use std::sync::Arc;

use crate::meta::MetadataStore;
use crate::plugin::PluginCoordinate;
use crate::pool::WorkerPool;
use crate::{Error, Result};

/// Fills the metadata cache for a plugin set and all of its dependencies.
pub struct ConcurrentFetcher {
    store: Arc<MetadataStore>,
    pool: WorkerPool,
}

impl ConcurrentFetcher {
    pub fn new(store: Arc<MetadataStore>, max_workers: usize) -> Self {
        Self {
            store,
            pool: WorkerPool::new(max_workers),
        }
    }

    /// Make sure metadata for `plugins` and their transitive dependencies,
    /// optional ones included, is cached.
    ///
    /// Failures do not stop the walk; they are collected and returned
    /// together once no more plugins can be reached. A plugin whose fetch
    /// failed contributes no dependencies.
    pub async fn ensure_cached(&self, plugins: &[PluginCoordinate]) -> Result<()> {
        let mut visited = HashSet::new();
        let mut level: Vec<PluginCoordinate> = plugins
            .iter()
            .filter(|p| visited.insert(p.filename()))
            .cloned()
            .collect();
        let mut errors = Vec::new();
        let mut depth = 0;

        while !level.is_empty() {
            tracing::info!(
                depth,
                plugins = level.len(),
                workers = self.pool.max_workers(),
                "Fetching metadata"
            );

            let store = Arc::clone(&self.store);
            let outcomes = self
                .pool
                .run(level, move |plugin| store.get_metadata(&plugin))
                .await;

            let mut next = Vec::new();
            for outcome in outcomes {
                match outcome {
                    Ok(metadata) => next.extend(
                        metadata
                            .all_dependencies()
                            .filter(|dependency| visited.insert(dependency.filename()))
                            .cloned(),
                    ),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to fetch metadata");
                        errors.push(e);
                    }
                }
            }

            level = next;
            depth += 1;
        }

        Error::from_batch(errors)
    }
}
