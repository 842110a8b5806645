//! Format-agnostic document loading and saving

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, io};

/// Document format, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Detect the format of a path from its extension.
    ///
    /// - `.json` -> JSON (also the store's `.meta`, `.graph`, `.war` and `.lock` entries)
    /// - `.yaml`, `.yml` -> YAML
    /// - `.toml` -> TOML
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" | "meta" | "graph" | "war" | "lock" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }
}

/// Format-agnostic document store.
///
/// Detects format from file extension and handles
/// serialization/deserialization transparently. Every save is atomic.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let format = Format::detect(path)?;
        let content = io::read_text(path)?;
        Self::parse(path, format, &content)
    }

    /// Load a document, falling back to `T::default()` when the file is absent.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        match self.load(path) {
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %path.display(), "No document found, using defaults");
                Ok(T::default())
            }
            other => other,
        }
    }

    fn parse<T: DeserializeOwned>(path: &Path, format: Format, content: &str) -> Result<T> {
        let parse_error = |message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.name().into(),
            message,
        };

        match format {
            Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            Format::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
            Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Render a document in the format the path's extension selects.
    pub fn render<T: Serialize>(&self, path: &Path, value: &T) -> Result<String> {
        let format = Format::detect(path)?;
        let serialize_error = |message: String| Error::ConfigSerialize {
            path: path.to_path_buf(),
            format: format.name().into(),
            message,
        };

        match format {
            Format::Json => serde_json::to_string_pretty(value)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| serialize_error(e.to_string())),
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string())),
            Format::Toml => {
                toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))
            }
        }
    }

    /// Save a document to a file.
    ///
    /// Format is determined from file extension.
    /// Uses atomic write to prevent corruption.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = self.render(path, value)?;
        io::write_atomic(path, content.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        workers: usize,
    }

    #[rstest]
    #[case("doc.json")]
    #[case("doc.yaml")]
    #[case("doc.yml")]
    #[case("doc.toml")]
    fn save_then_load_in_every_format(#[case] file: &str) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(file);
        let doc = Doc {
            name: "credentials".into(),
            workers: 4,
        };

        let store = ConfigStore::new();
        store.save(&path, &doc).unwrap();
        let loaded: Doc = store.load(&path).unwrap();

        assert_eq!(loaded, doc);
    }

    #[rstest]
    #[case("x.meta", Format::Json)]
    #[case("x.graph", Format::Json)]
    #[case("x.war", Format::Json)]
    #[case("plugins.json.lock", Format::Json)]
    #[case("X.YML", Format::Yaml)]
    fn detects_store_extensions(#[case] file: &str, #[case] expected: Format) {
        assert_eq!(Format::detect(Path::new(file)).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = Format::detect(Path::new("plugins.jsonnet")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { extension } if extension == "jsonnet"));
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let dir = tempdir().unwrap();
        let doc: Doc = ConfigStore::new()
            .load_or_default(&dir.path().join("config.toml"))
            .unwrap();
        assert_eq!(doc, Doc::default());
    }

    #[test]
    fn parse_error_names_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConfigStore::new().load::<Doc>(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { ref format, .. } if format == "JSON"));
    }
}
