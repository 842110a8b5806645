//! JAR manifest parsing
//!
//! Manifests are `Key: Value` lines. Long values are folded onto
//! continuation lines starting with a single space, and signed archives
//! repeat keys such as `Name` once per section, so entries keep their order
//! and duplicates.

use std::sync::LazyLock;

use regex::Regex;

use crate::plugin::{PluginCoordinate, PluginMetadata};
use crate::{Error, Result};

/// Location of the manifest inside plugin and WAR archives.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

pub const PLUGIN_VERSION: &str = "Plugin-Version";
pub const SHORT_NAME: &str = "Short-Name";
pub const LONG_NAME: &str = "Long-Name";
pub const PLUGIN_DEPENDENCIES: &str = "Plugin-Dependencies";

/// Marks a `Plugin-Dependencies` entry as optional.
const OPTIONAL_RESOLUTION: &str = "resolution:=optional";

static DEPENDENCY_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]+):([^;]+)(?:;(.*))?$").unwrap()
});

/// Parsed manifest entries in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(String, String)>,
}

impl Manifest {
    pub fn parse(text: &str) -> Self {
        let unfolded = text.replace("\r\n ", "").replace("\n ", "");

        let entries = unfolded
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                let key = key.trim();
                if key.is_empty() || key.contains(char::is_whitespace) {
                    return None;
                }
                Some((key.to_string(), value.trim().to_string()))
            })
            .collect();

        Self { entries }
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value recorded for `key`, in file order.
    pub fn get_all<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a str> + use<'a, 'k> {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-empty value for a field that must be present.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::MissingManifestField {
                field: key.to_string(),
            })
    }
}

/// Build plugin metadata from a plugin archive's manifest text.
pub fn parse_plugin_manifest(text: &str) -> Result<PluginMetadata> {
    let manifest = Manifest::parse(text);

    let version = manifest.require(PLUGIN_VERSION)?;
    let name = manifest.require(SHORT_NAME)?;
    let full_name = manifest.require(LONG_NAME)?;
    let (dependencies, optional_dependencies) =
        parse_dependencies(manifest.get(PLUGIN_DEPENDENCIES).unwrap_or_default())?;

    Ok(PluginMetadata {
        full_name: full_name.to_string(),
        plugin: PluginCoordinate::new(name, version),
        dependencies,
        optional_dependencies,
    })
}

/// Split a `Plugin-Dependencies` value into required and optional coordinates.
pub fn parse_dependencies(value: &str) -> Result<(Vec<PluginCoordinate>, Vec<PluginCoordinate>)> {
    let mut required = Vec::new();
    let mut optional = Vec::new();

    if value.trim().is_empty() {
        return Ok((required, optional));
    }

    for entry in value.split(',').map(str::trim) {
        let captures = DEPENDENCY_ENTRY
            .captures(entry)
            .ok_or_else(|| Error::MalformedDependency {
                entry: entry.to_string(),
            })?;

        let coordinate = PluginCoordinate::new(captures[1].trim(), captures[2].trim());
        let is_optional = captures
            .get(3)
            .is_some_and(|options| options.as_str().trim() == OPTIONAL_RESOLUTION);

        if is_optional {
            optional.push(coordinate);
        } else {
            required.push(coordinate);
        }
    }

    Ok((required, optional))
}
