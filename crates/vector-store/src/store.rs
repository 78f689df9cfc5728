use crate::EmbeddingResult;
use async_trait::async_trait;
use semindex_chunker::CodeChunk;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store initialization failed: {0}")]
    Init(String),

    /// A configuration error, not a per-item failure: the whole upsert is
    /// rejected.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("parallel list mismatch: {chunks} chunks, {embeddings} embeddings")]
    LengthMismatch { chunks: usize, embeddings: usize },

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Durable mapping from chunk identity to (embedding, chunk metadata).
///
/// Upsert, delete, and commit are individually atomic at the call level; the
/// store must tolerate concurrent upsert/delete from the batch job and the
/// incremental indexer (single writer per key is sufficient).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Prepare backing storage. Fails with [`StoreError::Init`] when the
    /// storage is unusable.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Insert-or-update chunks with their embeddings. The slices are
    /// parallel: same order, same length.
    async fn upsert_chunks(
        &self,
        chunks: &[CodeChunk],
        embeddings: &[EmbeddingResult],
    ) -> Result<(), StoreError>;

    /// Remove every chunk belonging to `path`. Returns the number removed.
    async fn delete_by_file(&self, path: &Path) -> Result<u64, StoreError>;

    /// Durability flush of everything ingested so far.
    async fn commit(&self) -> Result<(), StoreError>;

    /// Compaction step; only valid after the final commit of a run.
    async fn optimize(&self) -> Result<(), StoreError>;
}
