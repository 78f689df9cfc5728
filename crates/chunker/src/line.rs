use crate::chunker::{Chunker, Result};
use crate::CodeChunk;
use std::path::Path;

const DEFAULT_WINDOW_LINES: usize = 80;
const DEFAULT_OVERLAP_LINES: usize = 10;
const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "rst", "adoc"];

/// Fixed line-window chunker with overlap.
///
/// Fallback for plain-text formats where no structure-aware chunker applies.
pub struct LineWindowChunker {
    window_lines: usize,
    overlap_lines: usize,
    extensions: Vec<String>,
}

impl LineWindowChunker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW_LINES, DEFAULT_OVERLAP_LINES)
    }

    #[must_use]
    pub fn with_window(window_lines: usize, overlap_lines: usize) -> Self {
        let window_lines = window_lines.max(1);
        // Overlap must leave forward progress.
        let overlap_lines = overlap_lines.min(window_lines - 1);
        Self {
            window_lines,
            overlap_lines,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|s| (*s).to_string()).collect();
        self
    }
}

impl Default for LineWindowChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for LineWindowChunker {
    fn id(&self) -> &str {
        "line-window"
    }

    fn language(&self) -> &str {
        "text"
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    fn chunk(&self, path: &Path, content: &str, project: &str) -> Result<Vec<CodeChunk>> {
        if content.is_empty() {
            return Ok(Vec::new());
        }

        // Byte offset of the start of each line.
        let mut line_starts = vec![0usize];
        for (idx, byte) in content.bytes().enumerate() {
            if byte == b'\n' && idx + 1 < content.len() {
                line_starts.push(idx + 1);
            }
        }
        let line_count = line_starts.len();

        let mut chunks = Vec::new();
        let step = self.window_lines - self.overlap_lines;
        let mut first = 0usize;
        loop {
            let last = (first + self.window_lines).min(line_count);
            let start_offset = line_starts[first];
            let end_offset = if last == line_count {
                content.len()
            } else {
                line_starts[last]
            };
            let text = &content[start_offset..end_offset];

            chunks.push(CodeChunk::new(
                path,
                project,
                text.trim_end_matches('\n'),
                (first + 1) as u32,
                last as u32,
                start_offset,
                end_offset,
            ));

            if last == line_count {
                break;
            }
            first += step;
        }

        Ok(chunks)
    }
}
