use crate::config::IndexingConfig;
use crate::error::{IndexerError, Result};
use crate::pipeline::FileIndexer;
use crate::scanner::FileScanner;
use crate::stats::BatchStats;
use semindex_chunker::{ChunkerRegistry, CodeChunk};
use semindex_vector_store::{EmbeddingProvider, VectorStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// One open project in the workspace: a display name plus its root directory.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub root: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// Coarse progress reporting for the full scan, owned by the host.
pub trait ProgressSink: Send + Sync {
    fn on_project(&self, name: &str, index: usize, total: usize);
    fn on_project_done(&self, name: &str, files: u64);
}

/// Progress sink that discards everything.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_project(&self, _name: &str, _index: usize, _total: usize) {}
    fn on_project_done(&self, _name: &str, _files: u64) {}
}

/// Full workspace scan: enumerate, chunk, batch-embed, upsert, commit,
/// optimize. A long, cancellable background job; not re-entrant.
pub struct BatchIndexer {
    pipeline: FileIndexer,
    registry: Arc<ChunkerRegistry>,
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: IndexingConfig,
    running: AtomicBool,
}

impl BatchIndexer {
    /// Fails fast when the embedding provider is unconfigured or the store
    /// cannot be initialized: no indexer is returned rather than one that
    /// will fail at run time.
    pub async fn new(
        registry: Arc<ChunkerRegistry>,
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: IndexingConfig,
    ) -> Result<Self> {
        if !provider.is_configured() {
            return Err(IndexerError::NotConfigured);
        }
        store.initialize().await?;

        Ok(Self {
            pipeline: FileIndexer::new(
                registry.clone(),
                provider.clone(),
                store.clone(),
                config.clone(),
            ),
            registry,
            provider,
            store,
            config,
            running: AtomicBool::new(false),
        })
    }

    /// Run one full scan over `projects`.
    ///
    /// Only one scan may execute at a time; a second call while active
    /// returns [`IndexerError::AlreadyRunning`]. Cancellation is polled
    /// between files and propagated to the embedding provider so an in-flight
    /// batch call aborts promptly. A canceled run still flushes its partial
    /// batch and commits, returning `Ok` with `canceled` set.
    pub async fn run(
        &self,
        projects: &[Project],
        cancel: CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<BatchStats> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(IndexerError::AlreadyRunning);
        }

        // Forward cancellation to the provider so an outstanding
        // network/compute call is aborted, not awaited to completion.
        let forward = tokio::spawn({
            let token = cancel.clone();
            let provider = self.provider.clone();
            async move {
                token.cancelled().await;
                provider.cancel();
            }
        });

        let result = self.run_inner(projects, &cancel, progress).await;

        forward.abort();
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(
        &self,
        projects: &[Project],
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<BatchStats> {
        let start = Instant::now();
        let mut stats = BatchStats::new();
        let mut batch: Vec<CodeChunk> = Vec::new();

        log::info!("Full scan over {} project(s)", projects.len());

        'projects: for (index, project) in projects.iter().enumerate() {
            if cancel.is_cancelled() {
                stats.canceled = true;
                break;
            }
            progress.on_project(&project.name, index + 1, projects.len());

            if !project.root.is_dir() {
                log::warn!(
                    "Project root {} is not a directory, skipping project",
                    project.root.display()
                );
                stats.add_error(format!("invalid project root: {}", project.root.display()));
                continue;
            }

            let files_before = stats.files_indexed;
            // The walk touches every directory entry; keep it off the async
            // workers.
            let scanner = FileScanner::new(&project.root);
            let files = tokio::task::spawn_blocking(move || scanner.scan())
                .await
                .map_err(|e| IndexerError::Other(format!("file scan failed: {e}")))?;
            for file in &files {
                if cancel.is_cancelled() {
                    stats.canceled = true;
                    break 'projects;
                }
                if !self.registry.accepts(file) {
                    continue;
                }

                match self.pipeline.chunk_file(file, &project.name).await {
                    Ok(None) => stats.skip_oversize(),
                    Ok(Some(chunks)) => {
                        let produced = chunks.len();
                        if !push_chunks(&mut batch, chunks) {
                            // Allocation exhausted while buffering: drop the
                            // whole in-flight batch so its memory is
                            // reclaimed, count the file, keep scanning.
                            batch = Vec::new();
                            stats.add_error(format!(
                                "allocation failure buffering {}; in-flight batch discarded",
                                file.display()
                            ));
                            continue;
                        }
                        stats.add_file(produced);

                        if batch.len() >= self.config.batch_size {
                            let full = std::mem::take(&mut batch);
                            match self.pipeline.embed_and_upsert(&full).await {
                                Ok(()) => stats.batches += 1,
                                // Cancellation aborts the in-flight provider
                                // call; that abort is the cancellation
                                // surfacing, not a hard failure.
                                Err(e) if cancel.is_cancelled() => {
                                    log::warn!("Batch flush aborted by cancellation: {e}");
                                    stats.add_error(format!("flush: {e}"));
                                    stats.canceled = true;
                                    break 'projects;
                                }
                                Err(e) => return Err(e),
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!("Failed to process {}: {e}", file.display());
                        stats.add_error(format!("{}: {e}", file.display()));
                    }
                }
            }
            progress.on_project_done(&project.name, stats.files_indexed - files_before);
        }

        // Final flush of the partial batch. After cancellation a provider may
        // already refuse the call; that is logged and counted, and the commit
        // below still runs so the index stays valid though incomplete.
        if !batch.is_empty() {
            let full = std::mem::take(&mut batch);
            match self.pipeline.embed_and_upsert(&full).await {
                Ok(()) => stats.batches += 1,
                Err(e) if stats.canceled => {
                    log::warn!("Final flush failed after cancellation: {e}");
                    stats.add_error(format!("final flush: {e}"));
                }
                Err(e) => return Err(e),
            }
        }

        // Sequential by contract: optimize only after the final commit.
        self.store.commit().await?;
        self.store.optimize().await?;

        stats.time_ms = (start.elapsed().as_millis() as u64).max(1);
        log::info!(
            "Full scan finished: {} indexed, {} skipped, {} failed, {} chunks in {} batch(es), canceled={}",
            stats.files_indexed,
            stats.files_skipped,
            stats.files_failed,
            stats.chunks,
            stats.batches,
            stats.canceled
        );
        Ok(stats)
    }
}

/// Grow the batch through fallible allocation; `false` means the allocator
/// refused and the caller must discard the batch.
fn push_chunks(batch: &mut Vec<CodeChunk>, chunks: Vec<CodeChunk>) -> bool {
    if batch.try_reserve(chunks.len()).is_err() {
        return false;
    }
    batch.extend(chunks);
    true
}
