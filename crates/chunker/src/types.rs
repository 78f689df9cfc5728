use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Immutable unit of indexable content.
///
/// Produced only by chunkers and never mutated afterwards. Carries enough
/// position metadata to re-locate the fragment in its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChunk {
    /// Absolute path of the owning file.
    pub file_path: PathBuf,
    /// Name of the project the file belongs to.
    pub project: String,
    /// Chunk text.
    pub content: String,
    /// First line of the chunk, 1-based, inclusive.
    pub start_line: u32,
    /// Last line of the chunk, 1-based, inclusive.
    pub end_line: u32,
    /// Byte offset of the chunk start within the file.
    pub start_offset: usize,
    /// Byte offset one past the chunk end within the file.
    pub end_offset: usize,
}

impl CodeChunk {
    pub fn new(
        file_path: impl Into<PathBuf>,
        project: impl Into<String>,
        content: impl Into<String>,
        start_line: u32,
        end_line: u32,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            project: project.into(),
            content: content.into(),
            start_line,
            end_line,
            start_offset,
            end_offset,
        }
    }

    /// Stable identity of the chunk within the index, keyed by path and byte
    /// range. Two runs over identical content produce identical ids.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "{}:{}-{}",
            self.file_path.display(),
            self.start_offset,
            self.end_offset
        )
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}
