use crate::config::IndexingConfig;
use crate::error::{IndexerError, Result};
use crate::events::ChangeEvent;
use crate::pipeline::FileIndexer;
use semindex_chunker::ChunkerRegistry;
use semindex_vector_store::{EmbeddingProvider, VectorStore};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Update,
    Delete,
}

/// One scheduled operation for a path. At most one entry per path exists at
/// any time; replacing it aborts the superseded timer.
struct PendingEntry {
    kind: PendingKind,
    generation: u64,
    timer: JoinHandle<()>,
}

/// Message a timer sends to the worker when its quiet period elapses.
/// `flush` sends the same message with the delay bypassed and an ack channel
/// so it can await completion.
#[derive(Debug)]
struct Fire {
    path: PathBuf,
    kind: PendingKind,
    generation: u64,
    ack: Option<oneshot::Sender<()>>,
}

struct Shared {
    pending: Mutex<HashMap<PathBuf, PendingEntry>>,
    generations: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
        }
    }
}

struct Running {
    intake: JoinHandle<()>,
    worker: JoinHandle<()>,
    fire_tx: mpsc::Sender<Fire>,
}

/// Debounced incremental indexer.
///
/// Consumes change events from a bounded channel, coalesces rapid repeated
/// changes per file behind a quiet period, and schedules a single index or
/// delete operation once the burst settles. The newest event for a path
/// always wins: its predecessor's timer is canceled, never allowed to fire.
///
/// Timers for different paths run as independent tasks, but every firing is
/// funneled through one single-consumer worker, so executions are serialized
/// and an update/delete race for the same path cannot occur.
pub struct IncrementalIndexer {
    pipeline: Arc<FileIndexer>,
    registry: Arc<ChunkerRegistry>,
    project: String,
    config: IndexingConfig,
    shared: Arc<Shared>,
    active: tokio::sync::Mutex<Option<Running>>,
}

impl IncrementalIndexer {
    /// Fails fast when the provider is unconfigured or the store cannot be
    /// initialized, same as the batch path.
    pub async fn new(
        registry: Arc<ChunkerRegistry>,
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        project: impl Into<String>,
        config: IndexingConfig,
    ) -> Result<Self> {
        if !provider.is_configured() {
            return Err(IndexerError::NotConfigured);
        }
        store.initialize().await?;

        Ok(Self {
            pipeline: Arc::new(FileIndexer::new(
                registry.clone(),
                provider,
                store,
                config.clone(),
            )),
            registry,
            project: project.into(),
            config,
            shared: Arc::new(Shared::new()),
            active: tokio::sync::Mutex::new(None),
        })
    }

    /// Begin consuming change events. No-op if already active.
    pub async fn start(&self, events: mpsc::Receiver<ChangeEvent>) {
        let mut active = self.active.lock().await;
        if active.is_some() {
            log::debug!("Incremental indexer already active, ignoring start");
            return;
        }

        let (fire_tx, fire_rx) = mpsc::channel::<Fire>(self.config.event_channel_capacity);
        let intake = tokio::spawn(intake_loop(
            events,
            fire_tx.clone(),
            self.shared.clone(),
            self.registry.clone(),
            self.config.quiet_period,
        ));
        let worker = tokio::spawn(worker_loop(
            fire_rx,
            self.shared.clone(),
            self.pipeline.clone(),
            self.project.clone(),
        ));
        *active = Some(Running {
            intake,
            worker,
            fire_tx,
        });
        log::info!("Incremental indexer started (quiet period {:?})", self.config.quiet_period);
    }

    /// Unsubscribe, cancel all pending scheduled tasks without running them,
    /// clear tracking, and wait a bounded time for an already-firing task to
    /// finish. No-op if not active.
    pub async fn stop(&self) {
        let Some(Running {
            intake,
            mut worker,
            fire_tx,
        }) = self.active.lock().await.take()
        else {
            return;
        };

        intake.abort();
        {
            let mut pending = self.shared.pending.lock().unwrap_or_else(|e| e.into_inner());
            for (_, entry) in pending.drain() {
                entry.timer.abort();
            }
        }

        // The remaining fire senders live in the intake loop and the timer
        // tasks; with those aborted and our clone dropped the channel closes
        // and the worker drains out.
        drop(fire_tx);
        if tokio::time::timeout(self.config.stop_grace, &mut worker)
            .await
            .is_err()
        {
            log::warn!("Incremental worker did not finish within grace period, aborting");
            worker.abort();
        }
        log::info!("Incremental indexer stopped");
    }

    /// Immediately execute all currently pending deletes, bypassing their
    /// delay. Pending updates remain scheduled and fire at their original
    /// time: an update carries only a path, not the file content it needs,
    /// and re-reading mid-burst is what the quiet period exists to avoid.
    ///
    /// Flushed deletes go through the worker like any other firing, so one
    /// lands strictly after an operation already executing for its path.
    pub async fn flush(&self) {
        let fire_tx = self
            .active
            .lock()
            .await
            .as_ref()
            .map(|running| running.fire_tx.clone());

        // Abort the delay timers but leave the entries in place: whoever
        // executes each delete claims its entry through the generation check.
        let deletes: Vec<(PathBuf, u64)> = {
            let mut pending = self.shared.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending
                .iter_mut()
                .filter(|(_, entry)| entry.kind == PendingKind::Delete)
                .map(|(path, entry)| {
                    entry.timer.abort();
                    (path.clone(), entry.generation)
                })
                .collect()
        };

        if let Some(fire_tx) = fire_tx {
            let mut acks = Vec::with_capacity(deletes.len());
            for (path, generation) in deletes {
                let (ack_tx, ack_rx) = oneshot::channel();
                let fire = Fire {
                    path,
                    kind: PendingKind::Delete,
                    generation,
                    ack: Some(ack_tx),
                };
                if fire_tx.send(fire).await.is_ok() {
                    acks.push(ack_rx);
                }
            }
            for ack in acks {
                let _ = ack.await;
            }
        } else {
            // Not started; no worker exists, so execute inline.
            for (path, generation) in deletes {
                let claimed = {
                    let mut pending =
                        self.shared.pending.lock().unwrap_or_else(|e| e.into_inner());
                    match pending.get(&path) {
                        Some(entry) if entry.generation == generation => {
                            pending.remove(&path).is_some()
                        }
                        _ => false,
                    }
                };
                if !claimed {
                    continue;
                }
                if let Err(e) = self.pipeline.delete_file(&path).await {
                    log::warn!("Flush delete of {} failed: {e}", path.display());
                }
            }
        }
    }

    /// Number of paths with a pending operation.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.shared.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }
}

async fn intake_loop(
    mut events: mpsc::Receiver<ChangeEvent>,
    fire_tx: mpsc::Sender<Fire>,
    shared: Arc<Shared>,
    registry: Arc<ChunkerRegistry>,
    quiet: Duration,
) {
    while let Some(event) = events.recv().await {
        let path = event.path().to_path_buf();
        // Paths no registered chunker claims never enter the pending map.
        if !registry.accepts(&path) {
            continue;
        }
        let kind = if event.is_removal() {
            PendingKind::Delete
        } else {
            PendingKind::Update
        };
        schedule(&shared, &fire_tx, path, kind, quiet);
    }
}

/// Replace any pending operation for `path` with a freshly scheduled one.
fn schedule(
    shared: &Arc<Shared>,
    fire_tx: &mpsc::Sender<Fire>,
    path: PathBuf,
    kind: PendingKind,
    quiet: Duration,
) {
    let generation = shared.generations.fetch_add(1, Ordering::SeqCst);

    // Holding the map lock across the spawn keeps the worker from observing
    // the timer before its entry exists.
    let mut pending = shared.pending.lock().unwrap_or_else(|e| e.into_inner());
    let timer = tokio::spawn({
        let fire_tx = fire_tx.clone();
        let path = path.clone();
        async move {
            tokio::time::sleep(quiet).await;
            let _ = fire_tx
                .send(Fire {
                    path,
                    kind,
                    generation,
                    ack: None,
                })
                .await;
        }
    });

    if let Some(superseded) = pending.insert(
        path,
        PendingEntry {
            kind,
            generation,
            timer,
        },
    ) {
        superseded.timer.abort();
    }
}

async fn worker_loop(
    mut fire_rx: mpsc::Receiver<Fire>,
    shared: Arc<Shared>,
    pipeline: Arc<FileIndexer>,
    project: String,
) {
    while let Some(fire) = fire_rx.recv().await {
        let Fire {
            path,
            kind,
            generation,
            ack,
        } = fire;

        let still_current = {
            let mut pending = shared.pending.lock().unwrap_or_else(|e| e.into_inner());
            match pending.get(&path) {
                Some(entry) if entry.generation == generation => {
                    pending.remove(&path);
                    true
                }
                // Superseded or already claimed; a stale firing must not
                // apply.
                _ => false,
            }
        };

        if still_current {
            // Failures are isolated to this path; the scheduler keeps
            // running.
            match kind {
                PendingKind::Update => {
                    if let Err(e) = pipeline.reindex_file(&path, &project).await {
                        log::warn!("Incremental reindex of {} failed: {e}", path.display());
                    }
                }
                PendingKind::Delete => {
                    if let Err(e) = pipeline.delete_file(&path).await {
                        log::warn!("Incremental delete of {} failed: {e}", path.display());
                    }
                }
            }
        }

        if let Some(ack) = ack {
            let _ = ack.send(());
        }
    }
}
