//! Resolver settings
//!
//! Loaded from `<working-dir>/config.toml` when present:
//!
//! ```toml
//! max_workers = 16
//! optional = false
//! timeout_secs = 300
//! update_center_url = "https://updates.jenkins.io/download"
//! download_timeout_secs = 120
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use jpr_fs::ConfigStore;

use crate::downloader::DEFAULT_UPDATE_CENTER_URL;
use crate::Result;

/// File name of the settings document inside the working directory.
pub const SETTINGS_FILE: &str = "config.toml";

pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5 * 60;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 2 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Concurrent fetch workers; zero is treated as one.
    pub max_workers: usize,
    /// Lock optional dependencies like required ones.
    pub optional: bool,
    /// Deadline for fetching and building one graph.
    pub timeout_secs: u64,
    pub update_center_url: String,
    /// Per-request download timeout.
    pub download_timeout_secs: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            optional: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            update_center_url: DEFAULT_UPDATE_CENTER_URL.to_string(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl ResolverSettings {
    /// Settings from `working_dir`, or defaults when it has none.
    pub fn load(working_dir: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_or_default(&working_dir.join(SETTINGS_FILE))?)
    }

    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
