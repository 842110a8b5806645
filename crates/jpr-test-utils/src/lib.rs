//! Shared test utilities for the Jenkins plugins resolver workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`archive`]: real plugin and WAR archives built in memory
//! - [`downloader`]: [`MemoryDownloader`] serving those archives
//! - [`workspace`]: [`TestWorkspace`] temp directory with project files

pub mod archive;
pub mod downloader;
pub mod workspace;

pub use downloader::MemoryDownloader;
pub use workspace::TestWorkspace;
