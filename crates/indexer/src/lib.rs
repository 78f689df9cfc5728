//! # Semindex Indexer
//!
//! Batch and incremental indexing for semantic code search.
//!
//! ## Pipeline
//!
//! ```text
//! Project roots                    Change events
//!     │                                │
//!     ├──> File Scanner               ├──> Quiet-period coalescing
//!     │      (.gitignore aware)       │      (newest event per path wins)
//!     │                                │
//!     └──> Chunker registry  <────────┘
//!            └─> Code chunks
//!                  └─> Embedding provider (batched)
//!                        └─> Vector store (upsert, commit, optimize)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use semindex_indexer::{BatchIndexer, IndexingConfig, NullProgress, Project};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(
//! #     registry: Arc<semindex_chunker::ChunkerRegistry>,
//! #     provider: Arc<dyn semindex_vector_store::EmbeddingProvider>,
//! #     store: Arc<dyn semindex_vector_store::VectorStore>,
//! # ) -> anyhow::Result<()> {
//! let indexer = BatchIndexer::new(registry, provider, store, IndexingConfig::default()).await?;
//! let projects = vec![Project::new("demo", "/path/to/project")];
//! let stats = indexer
//!     .run(&projects, CancellationToken::new(), &NullProgress)
//!     .await?;
//!
//! println!("Indexed {} files, {} chunks", stats.files_indexed, stats.chunks);
//! # Ok(())
//! # }
//! ```

mod batch;
mod config;
mod error;
mod events;
mod incremental;
mod pipeline;
mod scanner;
mod stats;
mod watcher;

pub use batch::{BatchIndexer, NullProgress, ProgressSink, Project};
pub use config::IndexingConfig;
pub use error::{IndexerError, Result};
pub use events::{change_channel, ChangeEvent};
pub use incremental::IncrementalIndexer;
pub use pipeline::FileIndexer;
pub use scanner::FileScanner;
pub use stats::BatchStats;
pub use watcher::WorkspaceWatcher;
