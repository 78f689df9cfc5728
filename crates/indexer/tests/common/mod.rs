#![allow(dead_code)]

use async_trait::async_trait;
use semindex_chunker::{ChunkerDescriptor, ChunkerRegistry, LineWindowChunker};
use semindex_vector_store::{EmbedError, EmbeddingProvider, EmbeddingResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const DIMENSION: usize = 4;

/// Route crate logs through the test harness; safe to call per test.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic embedding provider for pipeline tests.
///
/// Records the size of every batch it receives. Optional failure modes:
/// `unconfigured` rejects construction-time checks, `failing` errors on
/// every batch, and `gated` parks each batch call until the test releases
/// the semaphore.
pub struct MockProvider {
    dimension: usize,
    configured: bool,
    fail: bool,
    canceled: AtomicBool,
    batch_sizes: Mutex<Vec<usize>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            dimension: DIMENSION,
            configured: true,
            fail: false,
            canceled: AtomicBool::new(false),
            batch_sizes: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Every batch call blocks on `gate` until the test adds permits.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    pub fn was_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for MockProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingResult>, EmbedError> {
        if !self.configured {
            return Err(EmbedError::NotConfigured);
        }
        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|_| EmbedError::Canceled)?;
        }
        if self.canceled.load(Ordering::SeqCst) {
            return Err(EmbedError::Canceled);
        }
        if self.fail {
            return Err(EmbedError::Provider("simulated provider failure".into()));
        }

        self.batch_sizes.lock().unwrap().push(texts.len());
        Ok(texts
            .iter()
            .enumerate()
            .map(|(i, _)| EmbeddingResult::new(i, vec![0.0; self.dimension]))
            .collect())
    }

    fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.close();
        }
    }
}

/// Registry with a single line-window chunker claiming `.txt` files, one
/// chunk per `window` lines.
pub fn text_registry(window: usize) -> Arc<ChunkerRegistry> {
    let registry = ChunkerRegistry::new();
    registry.register(ChunkerDescriptor::new(
        "line-window",
        "Line window",
        "text",
        0,
        move || Ok(Arc::new(LineWindowChunker::with_window(window, 0))),
    ));
    Arc::new(registry)
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// `lines` newline-terminated lines of equal shape.
pub fn lines(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("line {i}\n"))
        .collect::<String>()
}
