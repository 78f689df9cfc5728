use crate::CodeChunk;
use std::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChunkerError>;

#[derive(Error, Debug)]
pub enum ChunkerError {
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("unsupported file: {0}")]
    Unsupported(String),

    #[error("chunker construction failed: {0}")]
    Construction(String),

    #[error("{0}")]
    Other(String),
}

/// Contract for a pluggable file chunker.
///
/// Implementations are registry-owned singletons: they are created once via
/// the descriptor factory and shared across threads for the registry's
/// lifetime, so they must not hold per-file mutable state.
pub trait Chunker: Send + Sync {
    /// Unique chunker id, matching its descriptor.
    fn id(&self) -> &str;

    /// Nominal language tag this chunker is written for.
    fn language(&self) -> &str;

    /// Whether this chunker claims the given file. A chunker may claim files
    /// outside its nominal language, e.g. by extension override.
    fn can_handle(&self, path: &Path) -> bool;

    /// Split `content` into chunks. Fails with [`ChunkerError::Parse`] on
    /// malformed or unparseable input.
    fn chunk(&self, path: &Path, content: &str, project: &str) -> Result<Vec<CodeChunk>>;
}
