//! End-to-end resolution

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jpr_fs::StoreLayout;

use crate::bundled::reconcile;
use crate::downloader::{Downloader, UpdateCenterDownloader};
use crate::fetcher::ConcurrentFetcher;
use crate::graph::{Graph, GraphBuilder};
use crate::incompatibility::{Incompatibilities, find_incompatibilities};
use crate::locker::lock_plugins;
use crate::meta::MetadataStore;
use crate::plugin::{LockRegistry, PluginCoordinate};
use crate::pool::WorkerPool;
use crate::settings::ResolverSettings;
use crate::version::VersionOrdering;
use crate::war::BaseDistribution;
use crate::{Error, Result};

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Graph of the requested plugins.
    pub graph: Graph,
    /// One version per plugin, sorted by name.
    pub lock: LockRegistry,
    pub incompatibilities: Incompatibilities,
}

/// Runs the resolution pipeline against one working directory.
pub struct Resolver {
    layout: StoreLayout,
    store: Arc<MetadataStore>,
    ordering: VersionOrdering,
    settings: ResolverSettings,
}

impl Resolver {
    /// A resolver caching under `working_dir`, which is created if missing.
    pub fn new(
        working_dir: impl Into<PathBuf>,
        downloader: Arc<dyn Downloader>,
        settings: ResolverSettings,
    ) -> Result<Self> {
        let layout = StoreLayout::new(working_dir);
        layout.ensure_dirs()?;

        Ok(Self {
            store: Arc::new(MetadataStore::new(layout.clone(), downloader)),
            layout,
            ordering: VersionOrdering::new(),
            settings,
        })
    }

    /// A resolver downloading from the update center named in `settings`.
    pub fn with_update_center(
        working_dir: impl Into<PathBuf>,
        settings: ResolverSettings,
    ) -> Result<Self> {
        let downloader =
            UpdateCenterDownloader::new(&settings.update_center_url, settings.download_timeout());
        Self::new(working_dir, Arc::new(downloader), settings)
    }

    /// Dependency graph of `roots`, optional subtrees included.
    ///
    /// A cached graph is returned without fetching anything. Otherwise the
    /// metadata closure is fetched and the graph built, both under the
    /// configured deadline.
    pub async fn fetch_graph(&self, roots: &[PluginCoordinate]) -> Result<Graph> {
        let builder = GraphBuilder::new(&self.store, self.layout.clone());
        if let Some(graph) = builder.cached(roots, true)? {
            return Ok(graph);
        }

        let fetcher = ConcurrentFetcher::new(Arc::clone(&self.store), self.settings.workers());
        let work = async {
            fetcher.ensure_cached(roots).await?;
            builder.build(roots, true)
        };

        tokio::time::timeout(self.settings.timeout(), work)
            .await
            .map_err(|_| Error::Timeout {
                seconds: self.settings.timeout_secs,
            })?
    }

    /// Resolve `requested` plugins, reconciling with `bundled` ones if any.
    pub async fn resolve(
        &self,
        requested: &[PluginCoordinate],
        bundled: &[PluginCoordinate],
    ) -> Result<Resolution> {
        let graph = self.fetch_graph(requested).await?;
        let mut lock = lock_plugins(&graph, self.settings.optional, &self.ordering)?;
        let mut incompatibilities =
            find_incompatibilities(requested, &lock.plugins, &graph, &self.ordering)?;

        if !bundled.is_empty() {
            tracing::info!(plugins = bundled.len(), "Reconciling with bundled plugins");
            let bundled_graph = self.fetch_graph(bundled).await?;
            let bundled_lock =
                lock_plugins(&bundled_graph, self.settings.optional, &self.ordering)?;
            incompatibilities.extend(reconcile(
                requested,
                &bundled_lock,
                &mut lock,
                &self.ordering,
            )?);
        }

        lock.sort();
        tracing::info!(
            plugins = lock.len(),
            incompatibilities = incompatibilities.len(),
            "Resolved"
        );

        Ok(Resolution {
            graph,
            lock,
            incompatibilities,
        })
    }

    /// Make sure the artifact of every plugin is cached, returning their paths
    /// in input order.
    pub async fn fetch_artifacts(&self, plugins: &[PluginCoordinate]) -> Result<Vec<PathBuf>> {
        let artifacts = self.store.artifacts().clone();
        let outcomes = WorkerPool::new(self.settings.workers())
            .run(plugins.to_vec(), move |plugin| {
                artifacts
                    .fetch(&plugin)
                    .map_err(|e| e.for_plugin(plugin.identifier()))
            })
            .await;

        let mut paths = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(path) => paths.push(path),
                Err(e) => errors.push(e),
            }
        }
        Error::from_batch(errors)?;
        Ok(paths)
    }

    /// Read a base distribution, caching its parsed form.
    pub fn read_distribution(&self, war: &Path) -> Result<BaseDistribution> {
        BaseDistribution::read(war, &self.layout)
    }
}
