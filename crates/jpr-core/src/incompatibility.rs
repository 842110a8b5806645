//! Requested versions that the lock contradicts

use std::fmt;

use crate::graph::{Graph, GraphNode};
use crate::plugin::{PluginCoordinate, Requester};
use crate::version::VersionOrdering;
use crate::{Error, Result};

/// Cause reported when the graph pulled in a newer version than requested.
pub const NEWER_VERSION_REQUIRED: &str = "Some plugins require a newer version.";

/// A requested plugin whose locked version differs from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incompatibility {
    /// The plugin as it was requested.
    pub plugin: PluginCoordinate,
    pub cause: String,
    /// Chains of plugins leading to the conflicting version, or other
    /// explanation lines.
    pub requesters: Vec<String>,
}

/// Incompatibilities found during one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Incompatibilities(Vec<Incompatibility>);

impl Incompatibilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, incompatibility: Incompatibility) {
        self.0.push(incompatibility);
    }

    pub fn extend(&mut self, other: Incompatibilities) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Incompatibility> {
        self.0.iter()
    }

    /// Entry for a plugin name.
    pub fn get(&self, name: &str) -> Option<&Incompatibility> {
        self.0.iter().find(|i| i.plugin.name == name)
    }
}

impl From<Vec<Incompatibility>> for Incompatibilities {
    fn from(incompatibilities: Vec<Incompatibility>) -> Self {
        Self(incompatibilities)
    }
}

/// Tree report, sorted by plugin name.
impl fmt::Display for Incompatibilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<&Incompatibility> = self.0.iter().collect();
        sorted.sort_by(|a, b| a.plugin.name.cmp(&b.plugin.name));

        for (i, incompatibility) in sorted.iter().enumerate() {
            let last = i + 1 == sorted.len();
            let (branch, rail) = if last { ("└", " ") } else { ("├", "│") };

            writeln!(
                f,
                "  {branch}── Requester: {}",
                requester_label(&incompatibility.plugin)
            )?;
            writeln!(f, "  {rail}   Cause: {}", incompatibility.cause)?;
            for (j, requester) in incompatibility.requesters.iter().enumerate() {
                let glyph = if j + 1 == incompatibility.requesters.len() {
                    "└"
                } else {
                    "├"
                };
                writeln!(f, "  {rail}     {glyph}── {requester}")?;
            }
            writeln!(f, "  {rail}")?;
        }
        Ok(())
    }
}

/// `name:version (requester)`, or just `name:version` for unset requesters.
fn requester_label(plugin: &PluginCoordinate) -> String {
    match plugin.requester {
        Requester::Unset => plugin.identifier(),
        requester => format!("{} ({requester})", plugin.identifier()),
    }
}

/// Compare each requested plugin with the version the lock chose.
///
/// A plugin requested at a version older than the locked one is
/// incompatible, unless the base distribution asked for it: bundled plugins
/// are expected to be superseded. Each incompatibility lists every chain in
/// `graph` that leads to the locked version. A requested plugin missing
/// from the lock is an error; all such errors are returned together.
pub fn find_incompatibilities(
    requested: &[PluginCoordinate],
    locked: &[PluginCoordinate],
    graph: &Graph,
    ordering: &VersionOrdering,
) -> Result<Incompatibilities> {
    let mut found = Incompatibilities::new();
    let mut errors = Vec::new();

    for plugin in requested {
        let Some(lock) = locked.iter().find(|l| l.same_plugin(plugin)) else {
            errors.push(Error::MissingLockEntry {
                plugin: plugin.identifier(),
            });
            continue;
        };

        if plugin.requester == Requester::War {
            continue;
        }

        match ordering.lower(&plugin.version, &lock.version) {
            Ok(true) => {
                let target = lock.identifier();
                let mut requesters = Vec::new();
                for root in &graph.nodes {
                    collect_chains(root, &target, &mut Vec::new(), &mut requesters);
                }
                found.push(Incompatibility {
                    plugin: plugin.clone(),
                    cause: NEWER_VERSION_REQUIRED.to_string(),
                    requesters,
                });
            }
            Ok(false) => {}
            Err(e) => errors.push(e.for_plugin(plugin.identifier())),
        }
    }

    Error::from_batch(errors)?;
    Ok(found)
}

/// Record every path from `node` down to a node equal to `target`.
fn collect_chains(node: &GraphNode, target: &str, path: &mut Vec<String>, chains: &mut Vec<String>) {
    let identifier = node.plugin.identifier();
    let label = if path.is_empty() {
        requester_label(&node.plugin)
    } else {
        identifier.clone()
    };
    path.push(label);

    if identifier == target {
        chains.push(path.join(" > "));
    }
    for child in node.dependencies.iter().chain(&node.optional_dependencies) {
        collect_chains(child, target, path, chains);
    }

    path.pop();
}
