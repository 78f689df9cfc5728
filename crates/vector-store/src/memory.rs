use crate::{EmbeddingResult, StoreError, VectorStore};
use async_trait::async_trait;
use semindex_chunker::CodeChunk;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    entries: HashMap<String, (CodeChunk, Vec<f32>)>,
    commits: u64,
    optimizes: u64,
}

/// In-memory reference [`VectorStore`].
///
/// Backs tests and small hosts; enforces the same fixed-dimension and
/// parallel-list contracts a durable backend would.
pub struct MemoryVectorStore {
    dimension: usize,
    inner: RwLock<Inner>,
}

impl MemoryVectorStore {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            inner: RwLock::new(Inner::default()),
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn chunk_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// All chunks currently stored for `path`, in unspecified order.
    pub async fn chunks_for_file(&self, path: &Path) -> Vec<CodeChunk> {
        self.inner
            .read()
            .await
            .entries
            .values()
            .filter(|(chunk, _)| chunk.file_path == path)
            .map(|(chunk, _)| chunk.clone())
            .collect()
    }

    pub async fn commit_count(&self) -> u64 {
        self.inner.read().await.commits
    }

    pub async fn optimize_count(&self) -> u64 {
        self.inner.read().await.optimizes
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn upsert_chunks(
        &self,
        chunks: &[CodeChunk],
        embeddings: &[EmbeddingResult],
    ) -> Result<(), StoreError> {
        if chunks.len() != embeddings.len() {
            return Err(StoreError::LengthMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        for embedding in embeddings {
            if embedding.dimension() != self.dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.dimension(),
                });
            }
        }

        let mut inner = self.inner.write().await;
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            inner
                .entries
                .insert(chunk.id(), (chunk.clone(), embedding.vector.clone()));
        }
        Ok(())
    }

    async fn delete_by_file(&self, path: &Path) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|_, (chunk, _)| chunk.file_path != path);
        Ok((before - inner.entries.len()) as u64)
    }

    async fn commit(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.commits += 1;
        log::debug!("memory store commit #{} ({} chunks)", inner.commits, inner.entries.len());
        Ok(())
    }

    async fn optimize(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.optimizes += 1;
        Ok(())
    }
}
