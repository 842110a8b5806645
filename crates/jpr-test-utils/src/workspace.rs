//! [`TestWorkspace`]: temp directory for resolver scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding a working directory and input files.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Resolver working directory (`<root>/work`).
    pub fn working_dir(&self) -> PathBuf {
        self.root().join("work")
    }

    /// Write a JSON project file requesting `plugins` (`(name, version)` pairs).
    pub fn write_project(&self, file: &str, plugins: &[(&str, &str)]) -> PathBuf {
        let plugins: Vec<serde_json::Value> = plugins
            .iter()
            .map(|(name, version)| serde_json::json!({ "name": name, "version": version }))
            .collect();
        let content = serde_json::to_string_pretty(&serde_json::json!({ "plugins": plugins }))
            .unwrap();
        self.write_file(file, content.as_bytes())
    }

    /// Write raw bytes to a file relative to the root.
    pub fn write_file(&self, file: &str, content: &[u8]) -> PathBuf {
        let path = self.root().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Read a file relative to the root as text.
    pub fn read(&self, file: &str) -> String {
        fs::read_to_string(self.root().join(file))
            .unwrap_or_else(|e| panic!("failed to read {file}: {e}"))
    }
}
