mod common;

use common::{lines, text_registry, write_file, MockProvider, DIMENSION};
use pretty_assertions::assert_eq;
use semindex_indexer::{BatchIndexer, FileIndexer, IndexerError, IndexingConfig, NullProgress, Project};
use semindex_vector_store::{EmbeddingProvider, MemoryVectorStore, VectorStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

struct Fixture {
    provider: Arc<MockProvider>,
    store: Arc<MemoryVectorStore>,
    indexer: BatchIndexer,
}

async fn fixture(window: usize, provider: MockProvider, config: IndexingConfig) -> Fixture {
    common::init_logs();
    let provider = Arc::new(provider);
    let store = Arc::new(MemoryVectorStore::new(DIMENSION));
    let indexer = BatchIndexer::new(
        text_registry(window),
        provider.clone() as Arc<dyn EmbeddingProvider>,
        store.clone() as Arc<dyn VectorStore>,
        config,
    )
    .await
    .unwrap();
    Fixture {
        provider,
        store,
        indexer,
    }
}

#[tokio::test]
async fn batch_flushes_at_threshold_and_remainder_at_end() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", &lines(4));
    write_file(dir.path(), "b.txt", &lines(3));

    let config = IndexingConfig {
        batch_size: 4,
        ..IndexingConfig::default()
    };
    let fx = fixture(1, MockProvider::new(), config).await;
    let projects = vec![Project::new("demo", dir.path())];

    let stats = fx
        .indexer
        .run(&projects, CancellationToken::new(), &NullProgress)
        .await
        .unwrap();

    assert_eq!(stats.files_indexed, 2);
    assert_eq!(stats.chunks, 7);
    assert_eq!(stats.batches, 2);
    // One flush at the threshold, one final flush for the remainder.
    assert_eq!(fx.provider.batch_sizes(), vec![4, 3]);
    assert_eq!(fx.store.chunk_count().await, 7);
    assert_eq!(fx.store.commit_count().await, 1);
    assert_eq!(fx.store.optimize_count().await, 1);
}

#[tokio::test]
async fn oversize_and_unclaimed_files_are_skipped_without_chunking() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "big.txt", &lines(50));
    write_file(dir.path(), "small.txt", &lines(2));
    // No registered chunker claims this one; it is not even counted.
    write_file(dir.path(), "image.bin", "not text");

    let config = IndexingConfig {
        max_file_size_bytes: 20,
        ..IndexingConfig::default()
    };
    let fx = fixture(1, MockProvider::new(), config).await;
    let projects = vec![Project::new("demo", dir.path())];

    let stats = fx
        .indexer
        .run(&projects, CancellationToken::new(), &NullProgress)
        .await
        .unwrap();

    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.files_indexed, 1);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.chunks, 2);
    assert_eq!(fx.store.chunk_count().await, 2);
    assert_eq!(fx.store.commit_count().await, 1);
    assert_eq!(fx.store.optimize_count().await, 1);
}

#[tokio::test]
async fn chunk_output_is_truncated_per_file() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "long.txt", &lines(5));

    let config = IndexingConfig {
        max_chunks_per_file: 2,
        ..IndexingConfig::default()
    };
    let fx = fixture(1, MockProvider::new(), config).await;
    let projects = vec![Project::new("demo", dir.path())];

    let stats = fx
        .indexer
        .run(&projects, CancellationToken::new(), &NullProgress)
        .await
        .unwrap();

    assert_eq!(stats.files_indexed, 1);
    assert_eq!(stats.chunks, 2);
    assert_eq!(fx.store.chunk_count().await, 2);
}

#[tokio::test]
async fn pre_canceled_run_still_commits_and_reports_canceled() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", &lines(3));

    let fx = fixture(1, MockProvider::new(), IndexingConfig::default()).await;
    let projects = vec![Project::new("demo", dir.path())];
    let token = CancellationToken::new();
    token.cancel();

    let stats = fx
        .indexer
        .run(&projects, token, &NullProgress)
        .await
        .unwrap();

    assert!(stats.canceled);
    assert_eq!(stats.files_indexed, 0);
    // A canceled run ends with a valid, committed index.
    assert_eq!(fx.store.commit_count().await, 1);
    assert_eq!(fx.store.optimize_count().await, 1);
}

#[tokio::test]
async fn construction_fails_fast_without_configured_provider() {
    let store = Arc::new(MemoryVectorStore::new(DIMENSION));
    let result = BatchIndexer::new(
        text_registry(1),
        Arc::new(MockProvider::unconfigured()) as Arc<dyn EmbeddingProvider>,
        store as Arc<dyn VectorStore>,
        IndexingConfig::default(),
    )
    .await;

    assert!(matches!(result, Err(IndexerError::NotConfigured)));
}

#[tokio::test]
async fn second_run_while_active_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", &lines(1));

    let gate = Arc::new(Semaphore::new(0));
    let config = IndexingConfig {
        batch_size: 1,
        ..IndexingConfig::default()
    };
    let fx = fixture(1, MockProvider::gated(gate.clone()), config).await;
    let indexer = Arc::new(fx.indexer);
    let projects = vec![Project::new("demo", dir.path())];

    let first = tokio::spawn({
        let indexer = indexer.clone();
        let projects = projects.clone();
        async move {
            indexer
                .run(&projects, CancellationToken::new(), &NullProgress)
                .await
        }
    });

    // Let the first run park inside the gated embedding call.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = indexer
        .run(&projects, CancellationToken::new(), &NullProgress)
        .await;
    assert!(matches!(second, Err(IndexerError::AlreadyRunning)));

    gate.add_permits(16);
    let stats = first.await.unwrap().unwrap();
    assert_eq!(stats.files_indexed, 1);
}

#[tokio::test]
async fn mid_run_cancellation_reaches_the_provider_and_still_commits() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", &lines(1));

    let gate = Arc::new(Semaphore::new(0));
    let config = IndexingConfig {
        batch_size: 1,
        ..IndexingConfig::default()
    };
    let fx = fixture(1, MockProvider::gated(gate), config).await;
    let indexer = Arc::new(fx.indexer);
    let token = CancellationToken::new();
    let projects = vec![Project::new("demo", dir.path())];

    let run = tokio::spawn({
        let indexer = indexer.clone();
        let token = token.clone();
        let projects = projects.clone();
        async move {
            indexer
                .run(&projects, token, &NullProgress)
                .await
        }
    });

    // Let the run park inside the gated embedding call, then cancel: the
    // parked call must abort promptly rather than wait for the gate.
    tokio::time::sleep(Duration::from_millis(100)).await;
    token.cancel();

    let stats = run.await.unwrap().unwrap();
    assert!(stats.canceled);
    assert!(fx.provider.was_canceled());
    assert_eq!(stats.files_failed, 1);
    // The aborted flush is counted, and the run still ends with a valid,
    // committed index.
    assert_eq!(fx.store.commit_count().await, 1);
    assert_eq!(fx.store.optimize_count().await, 1);
}

#[tokio::test]
async fn embedding_failure_outside_cancellation_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", &lines(2));

    let config = IndexingConfig {
        batch_size: 1,
        ..IndexingConfig::default()
    };
    let fx = fixture(1, MockProvider::failing(), config).await;
    let projects = vec![Project::new("demo", dir.path())];

    let result = fx
        .indexer
        .run(&projects, CancellationToken::new(), &NullProgress)
        .await;

    assert!(matches!(result, Err(IndexerError::Embedding(_))));
}

#[tokio::test]
async fn invalid_project_root_is_counted_and_others_proceed() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", &lines(2));

    let fx = fixture(1, MockProvider::new(), IndexingConfig::default()).await;
    let projects = vec![
        Project::new("missing", dir.path().join("does-not-exist")),
        Project::new("demo", dir.path()),
    ];

    let stats = fx
        .indexer
        .run(&projects, CancellationToken::new(), &NullProgress)
        .await
        .unwrap();

    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.errors.len(), 1);
    assert_eq!(stats.files_indexed, 1);
    assert_eq!(fx.store.chunk_count().await, 2);
}

#[tokio::test]
async fn reindexing_a_file_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "a.txt", &lines(3));

    let provider = Arc::new(MockProvider::new());
    let store = Arc::new(MemoryVectorStore::new(DIMENSION));
    let pipeline = FileIndexer::new(
        text_registry(1),
        provider as Arc<dyn EmbeddingProvider>,
        store.clone() as Arc<dyn VectorStore>,
        IndexingConfig::default(),
    );

    let first = pipeline.reindex_file(&path, "demo").await.unwrap();
    let second = pipeline.reindex_file(&path, "demo").await.unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 3);
    assert_eq!(store.chunk_count().await, 3);
    assert_eq!(store.commit_count().await, 2);

    let removed = pipeline.delete_file(&path).await.unwrap();
    assert_eq!(removed, 3);
    assert_eq!(store.chunk_count().await, 0);
}
