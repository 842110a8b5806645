//! Dependency resolution pipeline for Jenkins plugins.
//!
//! Given a requested plugin set (and optionally the plugins bundled by a base
//! distribution), this crate fetches every transitive plugin manifest into an
//! on-disk cache, builds the dependency graph, collapses it into a lock with
//! one version per plugin and reports requests that the graph contradicts.
//!
//! The stages, in pipeline order:
//!
//! - [`fetcher::ConcurrentFetcher`] fills the [`meta::MetadataStore`] cache
//! - [`graph::GraphBuilder`] assembles the dependency tree from the cache
//! - [`locker::lock_plugins`] picks the winning version per plugin
//! - [`incompatibility::find_incompatibilities`] explains regressions
//! - [`bundled::reconcile`] merges a base distribution's plugin set
//!
//! [`resolver::Resolver`] runs all of them.

pub mod archive;
pub mod artifact;
pub mod bundled;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod graph;
pub mod incompatibility;
pub mod locker;
pub mod manifest;
pub mod meta;
pub mod plugin;
pub mod pool;
pub mod resolver;
pub mod settings;
pub mod version;
pub mod war;

pub use artifact::ArtifactStore;
pub use downloader::{Downloader, UpdateCenterDownloader};
pub use error::{Error, Result};
pub use fetcher::ConcurrentFetcher;
pub use graph::{Graph, GraphBuilder, GraphNode};
pub use incompatibility::{Incompatibilities, Incompatibility};
pub use meta::MetadataStore;
pub use plugin::{LockRegistry, PluginCoordinate, PluginMetadata, Project, Requester};
pub use resolver::{Resolution, Resolver};
pub use settings::ResolverSettings;
pub use version::VersionOrdering;
pub use war::BaseDistribution;
