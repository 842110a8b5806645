//! Graph building from the metadata cache

use std::sync::Arc;

use jpr_core::graph::graph_key;
use jpr_core::{ConcurrentFetcher, Error, GraphBuilder, MetadataStore, PluginCoordinate, Requester};
use jpr_fs::StoreLayout;
use jpr_test_utils::MemoryDownloader;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    store: Arc<MetadataStore>,
}

impl Fixture {
    async fn cached(downloader: MemoryDownloader, roots: &[PluginCoordinate]) -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MetadataStore::new(
            StoreLayout::new(dir.path()),
            Arc::new(downloader),
        ));
        ConcurrentFetcher::new(Arc::clone(&store), 4)
            .ensure_cached(roots)
            .await
            .unwrap();
        Self { dir, store }
    }

    fn builder(&self) -> GraphBuilder<'_> {
        GraphBuilder::new(&self.store, StoreLayout::new(self.dir.path()))
    }
}

fn git_universe() -> MemoryDownloader {
    MemoryDownloader::new()
        .with_plugin("git", "4.0.0", "scm-api:2.6.3,promoted-builds:2.27;resolution:=optional")
        .with_plugin("scm-api", "2.6.3", "structs:1.20")
        .with_plugin("promoted-builds", "2.27", "")
        .with_plugin("structs", "1.20", "")
        .with_plugin("mailer", "1.20", "")
}

#[tokio::test]
async fn builds_sorted_tree_with_requesters() {
    let roots = vec![
        PluginCoordinate::new("mailer", "1.20").with_requester(Requester::User),
        PluginCoordinate::new("git", "4.0.0").with_requester(Requester::User),
    ];
    let fixture = Fixture::cached(git_universe(), &roots).await;

    let graph = fixture.builder().build(&roots, true).unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.nodes[0].plugin.name, "git");
    assert_eq!(graph.nodes[0].plugin.requester, Requester::User);
    assert_eq!(graph.nodes[1].plugin.name, "mailer");
    let git = &graph.nodes[0];
    assert_eq!(git.dependencies[0].plugin.identifier(), "scm-api:2.6.3");
    assert_eq!(git.dependencies[0].dependencies[0].plugin.identifier(), "structs:1.20");
    assert_eq!(git.optional_dependencies[0].plugin.identifier(), "promoted-builds:2.27");
    assert!(graph.nodes[1].dependencies.is_empty());
}

#[tokio::test]
async fn optional_subtrees_only_when_requested() {
    let roots = vec![PluginCoordinate::new("git", "4.0.0")];
    let fixture = Fixture::cached(git_universe(), &roots).await;

    let graph = fixture.builder().build(&roots, false).unwrap();
    assert!(graph.nodes[0].optional_dependencies.is_empty());
    assert_eq!(graph.nodes[0].dependencies.len(), 1);
}

#[tokio::test]
async fn graph_is_cached_by_root_set() {
    let roots = vec![
        PluginCoordinate::new("git", "4.0.0"),
        PluginCoordinate::new("mailer", "1.20"),
    ];
    let fixture = Fixture::cached(git_universe(), &roots).await;
    let builder = fixture.builder();

    let first = builder.build(&roots, true).unwrap();
    let cache = fixture
        .dir
        .path()
        .join("graph")
        .join(format!("{}.graph", graph_key(&roots, true).unwrap()));
    assert!(cache.is_file());

    // Removing the metadata proves the second build reads the cached graph.
    std::fs::remove_dir_all(fixture.dir.path().join("meta")).unwrap();
    let reversed: Vec<PluginCoordinate> = roots.iter().rev().cloned().collect();
    let second = builder.build(&reversed, true).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn cycles_fail_with_path() {
    let downloader = MemoryDownloader::new()
        .with_plugin("a", "1.0", "b:1.0")
        .with_plugin("b", "1.0", "c:1.0")
        .with_plugin("c", "1.0", "a:1.0");
    let roots = vec![PluginCoordinate::new("a", "1.0")];
    let fixture = Fixture::cached(downloader, &roots).await;

    let err = fixture.builder().build(&roots, true).unwrap_err();
    match err {
        Error::DependencyCycle { path } => assert_eq!(path, "a:1.0 > b:1.0 > c:1.0 > a:1.0"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn uncached_dependency_fails_per_root() {
    let roots = vec![PluginCoordinate::new("mailer", "1.20")];
    let fixture = Fixture::cached(git_universe(), &roots).await;

    let err = fixture
        .builder()
        .build(
            &[
                PluginCoordinate::new("mailer", "1.20"),
                PluginCoordinate::new("git", "4.0.0"),
                PluginCoordinate::new("structs", "1.20"),
            ],
            true,
        )
        .unwrap_err();
    assert_eq!(err.leaves().len(), 2);
    assert!(err.leaves().iter().all(|e| e.is_not_found()));
}
