//! # Semindex Chunker
//!
//! Pluggable source-file chunking for semantic indexing.
//!
//! A [`Chunker`] splits one file into [`CodeChunk`]s, the unit of embedding
//! and retrieval. Hosts register [`ChunkerDescriptor`]s with a
//! [`ChunkerRegistry`] at startup; the registry resolves the best chunker for
//! a file by language and priority, instantiating implementations lazily.
//!
//! ## Example
//!
//! ```
//! use semindex_chunker::{ChunkerDescriptor, ChunkerRegistry, LineWindowChunker};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let registry = ChunkerRegistry::new();
//! registry.register(ChunkerDescriptor::new("line-window", "Line window", "text", 0, || {
//!     Ok(Arc::new(LineWindowChunker::new()))
//! }));
//!
//! let chunker = registry.chunker_for(Path::new("notes.txt")).unwrap();
//! let chunks = chunker.chunk(Path::new("notes.txt"), "hello\nworld\n", "demo").unwrap();
//! assert_eq!(chunks.len(), 1);
//! ```

mod chunker;
mod line;
mod registry;
mod types;

pub use chunker::{Chunker, ChunkerError, Result};
pub use line::LineWindowChunker;
pub use registry::{ChunkerDescriptor, ChunkerRegistry};
pub use types::CodeChunk;

/// Default token budget per chunk when a descriptor does not override it.
pub const DEFAULT_MAX_CHUNK_TOKENS: u32 = 512;

/// Default token overlap between adjacent chunks.
pub const DEFAULT_CHUNK_OVERLAP: u32 = 50;
