use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding provider is not configured")]
    NotConfigured,

    #[error("embedding batch call was canceled")]
    Canceled,

    #[error("embedding provider error: {0}")]
    Provider(String),
}

/// A fixed-dimension vector plus the identity of the input it was computed
/// for.
///
/// `chunk_index` names the position of the source text in the batch that
/// produced this result. Transient: created and discarded within one
/// batch-processing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub chunk_index: usize,
    pub vector: Vec<f32>,
}

impl EmbeddingResult {
    #[must_use]
    pub fn new(chunk_index: usize, vector: Vec<f32>) -> Self {
        Self {
            chunk_index,
            vector,
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Asynchronous batch embedding with cooperative cancellation.
///
/// The batch call is the only operation in the pipeline expected to block for
/// a non-trivial duration (network or model-compute latency), so it must
/// honor [`EmbeddingProvider::cancel`]: an in-flight call aborts promptly and
/// resolves to [`EmbedError::Canceled`] rather than hanging. Per-call
/// timeouts are owned by the provider, not by the pipeline.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Whether the provider is usable. Indexer construction fails fast when
    /// this returns false.
    fn is_configured(&self) -> bool;

    /// Dimension of every vector this provider produces. Must match the
    /// store's configured index dimension.
    fn dimension(&self) -> usize;

    /// Embed all `texts` in one call, returning one result per input in the
    /// same order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingResult>, EmbedError>;

    /// Abort any in-flight batch call promptly.
    fn cancel(&self);
}
