use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chunker error: {0}")]
    Chunker(#[from] semindex_chunker::ChunkerError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] semindex_vector_store::EmbedError),

    #[error("Vector store error: {0}")]
    Store(#[from] semindex_vector_store::StoreError),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),

    #[error("embedding provider is not configured")]
    NotConfigured,

    #[error("a full scan is already running")]
    AlreadyRunning,

    #[error("{0}")]
    Other(String),
}
