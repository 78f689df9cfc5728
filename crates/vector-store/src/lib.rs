//! # Semindex Vector Store
//!
//! Storage and embedding contracts for the indexing pipeline, plus an
//! in-memory reference store.
//!
//! The pipeline treats both as external collaborators: an
//! [`EmbeddingProvider`] turns chunk texts into fixed-dimension vectors in
//! one cancellable batch call, and a [`VectorStore`] durably maps chunk
//! identity to (embedding, metadata) with discrete `commit`/`optimize` steps.

mod embedding;
mod memory;
mod store;

pub use embedding::{EmbedError, EmbeddingProvider, EmbeddingResult};
pub use memory::MemoryVectorStore;
pub use store::{StoreError, VectorStore};
