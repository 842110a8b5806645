//! Collapse a dependency graph into one version per plugin
//!
//! The newest version seen anywhere in the graph wins. Optional dependencies
//! only count when asked for, or when the plugin they name is already part
//! of the lock through some required edge: Jenkins enforces the declared
//! minimum of an optional dependency whenever that plugin is installed.

use std::collections::BTreeMap;

use crate::graph::{Graph, GraphNode};
use crate::plugin::{LockRegistry, PluginCoordinate};
use crate::version::VersionOrdering;
use crate::Result;

struct LockState<'a> {
    ordering: &'a VersionOrdering,
    optional: bool,
    versions: BTreeMap<String, PluginCoordinate>,
}

impl LockState<'_> {
    /// Record `plugin` unless a newer version is already locked.
    ///
    /// The entry keeps the requester of the winning node. A dependency edge
    /// to the same version does not clear the requester of a root.
    ///
    /// Returns whether the plugin name was new to the lock.
    fn update(&mut self, plugin: &PluginCoordinate) -> Result<bool> {
        match self.versions.get_mut(&plugin.name) {
            None => {
                self.versions.insert(plugin.name.clone(), plugin.clone());
                Ok(true)
            }
            Some(current) => {
                if !self.ordering.lower(&plugin.version, &current.version)? {
                    let keeps_requester =
                        plugin.requester.is_unset() && plugin.version == current.version;
                    let requester = if keeps_requester {
                        current.requester
                    } else {
                        plugin.requester
                    };
                    *current = plugin.clone().with_requester(requester);
                }
                Ok(false)
            }
        }
    }

    fn walk_required(&mut self, node: &GraphNode) -> Result<()> {
        self.update(&node.plugin)?;
        for child in &node.dependencies {
            self.walk_required(child)?;
        }
        if self.optional {
            for child in &node.optional_dependencies {
                self.walk_required(child)?;
            }
        }
        Ok(())
    }

    /// Apply optional edges whose plugin is already locked.
    ///
    /// Returns whether any plugin name was added.
    fn walk_promoted(&mut self, node: &GraphNode, via_optional: bool) -> Result<bool> {
        if via_optional && !self.optional && !self.versions.contains_key(&node.plugin.name) {
            return Ok(false);
        }

        let mut added = self.update(&node.plugin)?;
        for child in &node.dependencies {
            added |= self.walk_promoted(child, false)?;
        }
        for child in &node.optional_dependencies {
            added |= self.walk_promoted(child, true)?;
        }
        Ok(added)
    }

    fn into_registry(self) -> LockRegistry {
        LockRegistry::new(self.versions.into_values().collect())
    }
}

/// Pick one version per plugin reachable in `graph`.
///
/// With `optional` set, optional dependencies are locked like required ones.
/// Otherwise an optional dependency only raises the version of a plugin that
/// is locked anyway. The result is sorted by plugin name. Any version that
/// cannot be compared aborts the lock.
pub fn lock_plugins(
    graph: &Graph,
    optional: bool,
    ordering: &VersionOrdering,
) -> Result<LockRegistry> {
    let mut state = LockState {
        ordering,
        optional,
        versions: BTreeMap::new(),
    };

    for node in &graph.nodes {
        state.walk_required(node)?;
    }

    // Promoting one optional plugin can pull in required dependencies that
    // promote others, so repeat until the set of names settles.
    loop {
        let mut added = false;
        for node in &graph.nodes {
            added |= state.walk_promoted(node, false)?;
        }
        if !added {
            break;
        }
    }

    let registry = state.into_registry();
    tracing::debug!(plugins = registry.len(), optional, "Locked plugins");
    Ok(registry)
}
