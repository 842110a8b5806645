//! Plugin artifact downloaders

use std::io::Write;
use std::time::Duration;

use crate::plugin::PluginCoordinate;
use crate::{Error, Result};

/// Public Jenkins update center download root.
pub const DEFAULT_UPDATE_CENTER_URL: &str = "https://updates.jenkins.io/download";

/// Per-request timeout for artifact downloads.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration =
    Duration::from_secs(crate::settings::DEFAULT_DOWNLOAD_TIMEOUT_SECS);

/// Source of plugin artifacts.
///
/// Implementations are called from many worker threads at once.
pub trait Downloader: Send + Sync {
    /// Where `plugin` is fetched from, for logs and errors.
    fn download_url(&self, plugin: &PluginCoordinate) -> String;

    /// Stream the artifact for `plugin` into `sink`.
    fn download(&self, plugin: &PluginCoordinate, sink: &mut dyn Write) -> Result<()>;
}

/// Downloads `.hpi` artifacts from a Jenkins update center.
pub struct UpdateCenterDownloader {
    base_url: String,
    agent: ureq::Agent,
}

impl UpdateCenterDownloader {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }
}

impl Default for UpdateCenterDownloader {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_CENTER_URL, DEFAULT_DOWNLOAD_TIMEOUT)
    }
}

impl Downloader for UpdateCenterDownloader {
    fn download_url(&self, plugin: &PluginCoordinate) -> String {
        format!(
            "{}/plugins/{}/{}/{}.hpi",
            self.base_url, plugin.name, plugin.version, plugin.name
        )
    }

    fn download(&self, plugin: &PluginCoordinate, sink: &mut dyn Write) -> Result<()> {
        let url = self.download_url(plugin);
        let failed = |reason: String| Error::Download {
            url: url.clone(),
            reason,
        };

        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(failed(format!("HTTP {code}"))),
            Err(e) => return Err(failed(e.to_string())),
        };
        if response.status() != 200 {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        std::io::copy(&mut response.into_reader(), sink).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_update_center_url() {
        let downloader = UpdateCenterDownloader::new(
            "https://mirror.example.org/download/",
            DEFAULT_DOWNLOAD_TIMEOUT,
        );
        assert_eq!(
            downloader.download_url(&PluginCoordinate::new("git", "4.0.0")),
            "https://mirror.example.org/download/plugins/git/4.0.0/git.hpi"
        );
    }

    #[test]
    fn default_targets_public_update_center() {
        let url = UpdateCenterDownloader::default()
            .download_url(&PluginCoordinate::new("mailer", "1.20"));
        assert_eq!(url, "https://updates.jenkins.io/download/plugins/mailer/1.20/mailer.hpi");
    }

    #[test]
    fn unreachable_host_is_download_error() {
        let downloader =
            UpdateCenterDownloader::new("http://127.0.0.1:9", Duration::from_millis(500));
        let mut sink = Vec::new();
        let err = downloader
            .download(&PluginCoordinate::new("git", "4.0.0"), &mut sink)
            .unwrap_err();
        assert!(matches!(err, Error::Download { ref url, .. } if url.ends_with("/git.hpi")));
        assert!(sink.is_empty());
    }
}
