use serde::Serialize;

const MAX_RETAINED_ERRORS: usize = 32;

/// Terminal status of one full-scan run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    /// Files chunked and handed to the embedding pipeline.
    pub files_indexed: u64,
    /// Files rejected by the size cap without chunking.
    pub files_skipped: u64,
    /// Files that hit a recoverable per-file error.
    pub files_failed: u64,
    /// Total chunks produced (after per-file truncation).
    pub chunks: u64,
    /// Number of embed/upsert flushes performed.
    pub batches: u64,
    /// Whether the run was stopped by cancellation. Not an error: the index
    /// is valid though incomplete.
    pub canceled: bool,
    pub time_ms: u64,
    /// First few per-file error messages, for diagnostics.
    pub errors: Vec<String>,
}

impl BatchStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, chunks: usize) {
        self.files_indexed += 1;
        self.chunks += chunks as u64;
    }

    pub fn skip_oversize(&mut self) {
        self.files_skipped += 1;
    }

    pub fn add_error(&mut self, message: String) {
        self.files_failed += 1;
        if self.errors.len() < MAX_RETAINED_ERRORS {
            self.errors.push(message);
        }
    }
}
