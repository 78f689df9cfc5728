use crate::config::IndexingConfig;
use crate::error::Result;
use semindex_chunker::{ChunkerRegistry, CodeChunk};
use semindex_vector_store::{EmbeddingProvider, VectorStore};
use std::path::Path;
use std::sync::Arc;

/// The single-file routine both indexing paths delegate to: resolve chunker,
/// enforce size and count caps, embed in batch-size slices, upsert.
pub struct FileIndexer {
    registry: Arc<ChunkerRegistry>,
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: IndexingConfig,
}

impl FileIndexer {
    pub fn new(
        registry: Arc<ChunkerRegistry>,
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: IndexingConfig,
    ) -> Self {
        Self {
            registry,
            provider,
            store,
            config,
        }
    }

    pub fn registry(&self) -> &ChunkerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.config
    }

    /// Chunk one file with the caps applied.
    ///
    /// `Ok(None)` means the file was rejected by the size cap and must not
    /// reach any chunker.
    pub(crate) async fn chunk_file(
        &self,
        path: &Path,
        project: &str,
    ) -> Result<Option<Vec<CodeChunk>>> {
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > self.config.max_file_size_bytes {
            log::info!(
                "Skipping oversize file {} ({} bytes > {} cap)",
                path.display(),
                metadata.len(),
                self.config.max_file_size_bytes
            );
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(path).await?;
        let Some(chunker) = self.registry.chunker_for(path) else {
            // Eligibility was checked by the caller; a file can lose its
            // chunker between scan and read only if the registry changed.
            return Ok(Some(Vec::new()));
        };

        let mut chunks = chunker.chunk(path, &content, project)?;
        if chunks.len() > self.config.max_chunks_per_file {
            log::info!(
                "Truncating {} from {} to {} chunks",
                path.display(),
                chunks.len(),
                self.config.max_chunks_per_file
            );
            chunks.truncate(self.config.max_chunks_per_file);
        }
        Ok(Some(chunks))
    }

    /// One batched embedding call for `chunks`, then upsert. Errors here are
    /// hard failures for the surrounding job.
    pub(crate) async fn embed_and_upsert(&self, chunks: &[CodeChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.provider.embed_batch(&texts).await?;
        self.store.upsert_chunks(chunks, &embeddings).await?;
        Ok(())
    }

    /// Single-file reindex: delete-by-path, then chunk/embed/upsert, then
    /// commit. Commit runs even when chunking fails so the deletion is
    /// durable and the store never keeps stale chunks for the path.
    pub async fn reindex_file(&self, path: &Path, project: &str) -> Result<usize> {
        self.store.delete_by_file(path).await?;

        let outcome = self.reindex_content(path, project).await;
        let commit = self.store.commit().await;

        let count = outcome?;
        commit?;
        log::debug!("Reindexed {} ({count} chunks)", path.display());
        Ok(count)
    }

    async fn reindex_content(&self, path: &Path, project: &str) -> Result<usize> {
        let Some(chunks) = self.chunk_file(path, project).await? else {
            return Ok(0);
        };
        for slice in chunks.chunks(self.config.batch_size.max(1)) {
            self.embed_and_upsert(slice).await?;
        }
        Ok(chunks.len())
    }

    /// Remove a file from the index and commit. Bypasses embedding entirely.
    pub async fn delete_file(&self, path: &Path) -> Result<u64> {
        let removed = self.store.delete_by_file(path).await?;
        self.store.commit().await?;
        log::debug!("Deleted {} ({removed} chunks)", path.display());
        Ok(removed)
    }
}
