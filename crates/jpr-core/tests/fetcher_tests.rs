//! Concurrent metadata fetching over a dependency closure

use std::sync::Arc;
use std::time::Duration;

use jpr_core::{ConcurrentFetcher, Error, MetadataStore, PluginCoordinate};
use jpr_fs::StoreLayout;
use jpr_test_utils::MemoryDownloader;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn fetcher(
    downloader: &Arc<MemoryDownloader>,
    workers: usize,
) -> (tempfile::TempDir, Arc<MetadataStore>, ConcurrentFetcher) {
    let dir = tempdir().unwrap();
    let store = Arc::new(MetadataStore::new(
        StoreLayout::new(dir.path()),
        Arc::clone(downloader) as Arc<dyn jpr_core::Downloader>,
    ));
    let fetcher = ConcurrentFetcher::new(Arc::clone(&store), workers);
    (dir, store, fetcher)
}

fn coordinates(pairs: &[(&str, &str)]) -> Vec<PluginCoordinate> {
    pairs
        .iter()
        .map(|(name, version)| PluginCoordinate::new(*name, *version))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fetches_transitive_closure_once() {
    let downloader = Arc::new(
        MemoryDownloader::new()
            .with_plugin("git", "4.0.0", "scm-api:2.6.3,credentials:2.3.0")
            .with_plugin("workflow-scm-step", "2.7", "scm-api:2.6.3")
            .with_plugin("scm-api", "2.6.3", "structs:1.20")
            .with_plugin("credentials", "2.3.0", "structs:1.20")
            .with_plugin("structs", "1.20", ""),
    );
    let (_dir, store, fetcher) = fetcher(&downloader, 3);

    fetcher
        .ensure_cached(&coordinates(&[("git", "4.0.0"), ("workflow-scm-step", "2.7")]))
        .await
        .unwrap();

    let mut downloads = downloader.downloads();
    downloads.sort();
    assert_eq!(
        downloads,
        vec![
            "credentials:2.3.0",
            "git:4.0.0",
            "scm-api:2.6.3",
            "structs:1.20",
            "workflow-scm-step:2.7",
        ]
    );
    for plugin in coordinates(&[("structs", "1.20"), ("credentials", "2.3.0")]) {
        assert!(store.is_cached(&plugin).unwrap());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn optional_dependencies_are_fetched_too() {
    let downloader = Arc::new(
        MemoryDownloader::new()
            .with_plugin("git", "4.0.0", "promoted-builds:2.27;resolution:=optional")
            .with_plugin("promoted-builds", "2.27", ""),
    );
    let (_dir, store, fetcher) = fetcher(&downloader, 2);

    fetcher.ensure_cached(&coordinates(&[("git", "4.0.0")])).await.unwrap();
    assert!(store.is_cached(&PluginCoordinate::new("promoted-builds", "2.27")).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bounded_workers_complete_every_job() {
    let mut downloader = MemoryDownloader::new().with_delay(Duration::from_millis(20));
    let mut roots = Vec::new();
    for i in 0..12 {
        let name = format!("plugin-{i}");
        downloader = downloader.with_plugin(&name, "1.0", "");
        roots.push(PluginCoordinate::new(name, "1.0"));
    }
    let downloader = Arc::new(downloader);
    let (_dir, store, fetcher) = fetcher(&downloader, 3);

    fetcher.ensure_cached(&roots).await.unwrap();

    assert_eq!(downloader.download_count(), 12);
    assert!(downloader.peak_concurrency() <= 3);
    for root in &roots {
        assert!(store.is_cached(root).unwrap());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failures_are_aggregated_and_siblings_finish() {
    let downloader = Arc::new(
        MemoryDownloader::new()
            .with_plugin("a", "1.0", "")
            .with_plugin("b", "1.0", "ghost:2.0")
            .with_plugin("c", "1.0", ""),
    );
    let (_dir, store, fetcher) = fetcher(&downloader, 2);

    let err = fetcher
        .ensure_cached(&coordinates(&[
            ("a", "1.0"),
            ("missing", "1.0"),
            ("b", "1.0"),
            ("absent", "3.0"),
            ("c", "1.0"),
        ]))
        .await
        .unwrap_err();

    let failed: Vec<String> = err.leaves().iter().map(|e| e.to_string()).collect();
    assert_eq!(failed.len(), 3, "{err}");
    assert!(failed.iter().any(|m| m.starts_with("missing:1.0")));
    assert!(failed.iter().any(|m| m.starts_with("absent:3.0")));
    assert!(failed.iter().any(|m| m.starts_with("ghost:2.0")));
    assert!(matches!(err, Error::Batch(_)));

    for ok in coordinates(&[("a", "1.0"), ("b", "1.0"), ("c", "1.0")]) {
        assert!(store.is_cached(&ok).unwrap());
    }
    assert_eq!(downloader.download_count(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_plugin_is_not_descended_into() {
    let downloader = Arc::new(
        MemoryDownloader::new().with_artifact("broken", "1.0", b"not a zip".to_vec()),
    );
    let (_dir, _store, fetcher) = fetcher(&downloader, 2);

    let err = fetcher
        .ensure_cached(&coordinates(&[("broken", "1.0")]))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("broken:1.0"));
    assert_eq!(downloader.download_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cyclic_manifests_terminate() {
    let downloader = Arc::new(
        MemoryDownloader::new()
            .with_plugin("a", "1.0", "b:1.0")
            .with_plugin("b", "1.0", "a:1.0"),
    );
    let (_dir, _store, fetcher) = fetcher(&downloader, 2);

    fetcher.ensure_cached(&coordinates(&[("a", "1.0")])).await.unwrap();
    assert_eq!(downloader.download_count(), 2);
}

#[tokio::test]
async fn empty_request_is_a_no_op() {
    let downloader = Arc::new(MemoryDownloader::new());
    let (_dir, _store, fetcher) = fetcher(&downloader, 0);

    fetcher.ensure_cached(&[]).await.unwrap();
    assert_eq!(downloader.download_count(), 0);
}
