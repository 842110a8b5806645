//! Dependency graph construction and caching
//!
//! The graph is a tree per root plugin: shared dependencies appear once
//! under every plugin that needs them. Graphs are cached by a digest of the
//! sorted root set, so a repeated resolution of the same project reads the
//! graph straight from `graph/<sha256>.graph`.

use serde::{Deserialize, Serialize};

use jpr_fs::checksum::sha256_hex;
use jpr_fs::{ConfigStore, StoreDir, StoreLayout, io};

use crate::meta::MetadataStore;
use crate::plugin::PluginCoordinate;
use crate::{Error, Result};

/// One plugin and the subtrees of what it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub plugin: PluginCoordinate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<GraphNode>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        alias = "optional_dependencies"
    )]
    pub optional_dependencies: Vec<GraphNode>,
}

impl GraphNode {
    pub fn leaf(plugin: PluginCoordinate) -> Self {
        Self {
            plugin,
            dependencies: Vec::new(),
            optional_dependencies: Vec::new(),
        }
    }
}

/// Root nodes, one per requested plugin, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
}

#[derive(Serialize)]
struct GraphKey<'a> {
    plugins: Vec<&'a PluginCoordinate>,
    optional: bool,
}

/// Cache key of the graph for a root set.
///
/// Roots are sorted first so the key does not depend on input order.
pub fn graph_key(roots: &[PluginCoordinate], include_optional: bool) -> Result<String> {
    let mut plugins: Vec<&PluginCoordinate> = roots.iter().collect();
    plugins.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));

    let serialized = serde_json::to_vec(&GraphKey {
        plugins,
        optional: include_optional,
    })?;

    Ok(sha256_hex(&serialized))
}

/// Builds dependency graphs from cached metadata.
pub struct GraphBuilder<'a> {
    store: &'a MetadataStore,
    layout: StoreLayout,
    documents: ConfigStore,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(store: &'a MetadataStore, layout: StoreLayout) -> Self {
        Self {
            store,
            layout,
            documents: ConfigStore::new(),
        }
    }

    /// Graph previously built for this root set, if any.
    pub fn cached(
        &self,
        roots: &[PluginCoordinate],
        include_optional: bool,
    ) -> Result<Option<Graph>> {
        let path = self
            .layout
            .entry(StoreDir::Graph, &graph_key(roots, include_optional)?);
        if !io::file_exists(&path)? {
            return Ok(None);
        }
        tracing::info!(path = %path.display(), "Reading graph from cache");
        Ok(Some(self.documents.load(&path)?))
    }

    /// Build the graph for `roots` from the metadata cache.
    ///
    /// Every reachable plugin must already be cached. Optional dependency
    /// subtrees are only included when `include_optional` is set. Failures
    /// are collected per root and returned together.
    pub fn build(&self, roots: &[PluginCoordinate], include_optional: bool) -> Result<Graph> {
        if let Some(graph) = self.cached(roots, include_optional)? {
            return Ok(graph);
        }

        tracing::info!(roots = roots.len(), include_optional, "Computing graph");

        let mut sorted: Vec<&PluginCoordinate> = roots.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));

        let mut nodes = Vec::with_capacity(sorted.len());
        let mut errors = Vec::new();
        for root in sorted {
            match self.build_node(root, include_optional, &mut Vec::new()) {
                Ok(node) => nodes.push(node),
                Err(e) => errors.push(e),
            }
        }
        Error::from_batch(errors)?;

        let graph = Graph { nodes };
        let path = self
            .layout
            .entry(StoreDir::Graph, &graph_key(roots, include_optional)?);
        self.documents.save(&path, &graph)?;
        Ok(graph)
    }

    fn build_node(
        &self,
        plugin: &PluginCoordinate,
        include_optional: bool,
        path: &mut Vec<String>,
    ) -> Result<GraphNode> {
        let identifier = plugin.identifier();
        if path.contains(&identifier) {
            path.push(identifier);
            return Err(Error::DependencyCycle {
                path: path.join(" > "),
            });
        }
        path.push(identifier);

        let metadata = self.store.read_cached(plugin)?;

        let dependencies = metadata
            .dependencies
            .iter()
            .map(|dependency| self.build_node(dependency, include_optional, path))
            .collect::<Result<Vec<_>>>()?;

        let optional_dependencies = if include_optional {
            metadata
                .optional_dependencies
                .iter()
                .map(|dependency| self.build_node(dependency, include_optional, path))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        path.pop();
        Ok(GraphNode {
            plugin: plugin.clone(),
            dependencies,
            optional_dependencies,
        })
    }
}
