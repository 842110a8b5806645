//! Plugin coordinates, metadata and lock documents

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who asked for a root plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requester {
    /// Discovered as a dependency; nobody asked for it directly.
    #[default]
    Unset,
    /// Listed in the user's project file.
    User,
    /// Bundled by the base distribution.
    War,
}

impl Requester {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::User => "user",
            Self::War => "war",
        }
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin at a specific version.
///
/// Two coordinates denote the same plugin when their names match; the
/// version distinguishes releases of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginCoordinate {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Requester::is_unset")]
    pub requester: Requester,
}

impl PluginCoordinate {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            requester: Requester::Unset,
        }
    }

    pub fn with_requester(mut self, requester: Requester) -> Self {
        self.requester = requester;
        self
    }

    /// `name-version`, the stem of every cache entry for this coordinate.
    pub fn filename(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// `name:version`, used in logs and reports.
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }

    /// Whether both coordinates name the same plugin, whatever the version.
    pub fn same_plugin(&self, other: &PluginCoordinate) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for PluginCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// What a plugin's manifest declares about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    pub full_name: String,
    pub plugin: PluginCoordinate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PluginCoordinate>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        alias = "optional_dependencies"
    )]
    pub optional_dependencies: Vec<PluginCoordinate>,
}

impl PluginMetadata {
    /// Required dependencies followed by optional ones.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &PluginCoordinate> {
        self.dependencies.iter().chain(&self.optional_dependencies)
    }

    /// One-line summary of the plugin and its dependencies.
    pub fn describe(&self) -> String {
        let dependencies: Vec<String> = self
            .all_dependencies()
            .map(PluginCoordinate::identifier)
            .collect();
        if dependencies.is_empty() {
            format!("{} has no dependencies", self.plugin.identifier())
        } else {
            format!(
                "{} depends on [{}]",
                self.plugin.identifier(),
                dependencies.join(", ")
            )
        }
    }
}

/// The lock document: one coordinate per plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRegistry {
    #[serde(default)]
    pub plugins: Vec<PluginCoordinate>,
}

impl LockRegistry {
    pub fn new(plugins: Vec<PluginCoordinate>) -> Self {
        Self { plugins }
    }

    /// Entry locked for a plugin name.
    pub fn get(&self, name: &str) -> Option<&PluginCoordinate> {
        self.plugins.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PluginCoordinate> {
        self.plugins.iter_mut().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sort entries by plugin name.
    pub fn sort(&mut self) {
        self.plugins.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// A user project file listing the requested plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, alias = "dependencies")]
    pub plugins: Vec<PluginCoordinate>,
}

impl Project {
    /// The requested coordinates, tagged as user requests.
    pub fn requested(&self) -> Vec<PluginCoordinate> {
        self.plugins
            .iter()
            .cloned()
            .map(|p| p.with_requester(Requester::User))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn coordinate_names() {
        let plugin = PluginCoordinate::new("credentials", "2.3.0");
        assert_eq!(plugin.filename(), "credentials-2.3.0");
        assert_eq!(plugin.identifier(), "credentials:2.3.0");
        assert_eq!(plugin.to_string(), "credentials:2.3.0");
    }

    #[test]
    fn same_plugin_ignores_version() {
        let a = PluginCoordinate::new("git", "4.0.0");
        let b = PluginCoordinate::new("git", "3.0.0").with_requester(Requester::War);
        assert!(a.same_plugin(&b));
        assert!(!a.same_plugin(&PluginCoordinate::new("git-client", "4.0.0")));
    }

    #[test]
    fn unset_requester_is_not_serialized() {
        let json = serde_json::to_string(&PluginCoordinate::new("git", "4.0.0")).unwrap();
        assert_eq!(json, r#"{"name":"git","version":"4.0.0"}"#);

        let json = serde_json::to_string(
            &PluginCoordinate::new("git", "4.0.0").with_requester(Requester::War),
        )
        .unwrap();
        assert_eq!(json, r#"{"name":"git","version":"4.0.0","requester":"war"}"#);
    }

    #[test]
    fn metadata_accepts_snake_case_optional_dependencies() {
        let json = r#"{
            "fullName": "Git plugin",
            "plugin": {"name": "git", "version": "4.0.0"},
            "optional_dependencies": [{"name": "promoted-builds", "version": "2.27"}]
        }"#;
        let metadata: PluginMetadata = serde_json::from_str(json).unwrap();
        assert!(metadata.dependencies.is_empty());
        assert_eq!(
            metadata.optional_dependencies,
            vec![PluginCoordinate::new("promoted-builds", "2.27")]
        );
    }

    #[test]
    fn describe_lists_all_dependencies() {
        let metadata = PluginMetadata {
            full_name: "Git plugin".into(),
            plugin: PluginCoordinate::new("git", "4.0.0"),
            dependencies: vec![PluginCoordinate::new("scm-api", "2.6.3")],
            optional_dependencies: vec![PluginCoordinate::new("promoted-builds", "2.27")],
        };
        assert_eq!(
            metadata.describe(),
            "git:4.0.0 depends on [scm-api:2.6.3, promoted-builds:2.27]"
        );

        let leaf = PluginMetadata {
            dependencies: vec![],
            optional_dependencies: vec![],
            ..metadata
        };
        assert_eq!(leaf.describe(), "git:4.0.0 has no dependencies");
    }

    #[test]
    fn project_accepts_dependencies_alias() {
        let project: Project = serde_json::from_str(
            r#"{"dependencies": [{"name": "git", "version": "4.0.0"}]}"#,
        )
        .unwrap();
        let requested = project.requested();
        assert_eq!(requested.len(), 1);
        assert_eq!(requested[0].requester, Requester::User);
    }

    #[test]
    fn lock_registry_sorts_by_name() {
        let mut lock = LockRegistry::new(vec![
            PluginCoordinate::new("workflow-api", "2.40"),
            PluginCoordinate::new("credentials", "2.3.0"),
        ]);
        lock.sort();
        assert_eq!(lock.plugins[0].name, "credentials");
        assert_eq!(lock.get("workflow-api").map(|p| p.version.as_str()), Some("2.40"));
        assert!(!lock.contains("git"));
    }
}
