use crate::config::IndexingConfig;
use crate::error::{IndexerError, Result};
use crate::events::ChangeEvent;
use crate::scanner::is_relevant_path;
use log::warn;
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Filesystem watcher that feeds the incremental indexer.
///
/// Wraps a recursive notify watcher on the workspace root and converts raw
/// backend events into [`ChangeEvent`]s, dropping noise from ignored
/// directories before it reaches the scheduler.
pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
    forward: JoinHandle<()>,
}

impl WorkspaceWatcher {
    /// Start watching `root` and return the change stream alongside the
    /// watcher handle. Dropping the handle stops the stream.
    pub fn start(
        root: &Path,
        config: &IndexingConfig,
    ) -> Result<(Self, mpsc::Receiver<ChangeEvent>)> {
        let (raw_tx, raw_rx) = mpsc::channel(config.event_channel_capacity);
        let (change_tx, change_rx) = mpsc::channel(config.event_channel_capacity);

        let watcher = create_fs_watcher(root, raw_tx, config.notify_poll_interval)?;
        let forward = tokio::spawn(forward_loop(root.to_path_buf(), raw_rx, change_tx));

        Ok((
            Self {
                _watcher: watcher,
                forward,
            },
            change_rx,
        ))
    }
}

impl Drop for WorkspaceWatcher {
    fn drop(&mut self) {
        self.forward.abort();
    }
}

fn create_fs_watcher(
    root: &Path,
    sender: mpsc::Sender<notify::Result<Event>>,
    poll_interval: Duration,
) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = sender.blocking_send(res);
        },
        NotifyConfig::default().with_poll_interval(poll_interval),
    )
    .map_err(|e| IndexerError::Other(format!("watcher init failed: {e}")))?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| IndexerError::Other(format!("failed to watch {}: {e}", root.display())))?;
    Ok(watcher)
}

async fn forward_loop(
    root: PathBuf,
    mut raw_rx: mpsc::Receiver<notify::Result<Event>>,
    change_tx: mpsc::Sender<ChangeEvent>,
) {
    while let Some(res) = raw_rx.recv().await {
        match res {
            Ok(event) => {
                for change in convert_event(&root, event) {
                    if change_tx.send(change).await.is_err() {
                        return;
                    }
                }
            }
            Err(err) => warn!("Watcher error: {err}"),
        }
    }
}

/// Map one notify event onto zero or more change events, one per relevant
/// path. Access events carry no content change and are dropped.
fn convert_event(root: &Path, event: Event) -> Vec<ChangeEvent> {
    let make: fn(PathBuf) -> ChangeEvent = match event.kind {
        EventKind::Create(_) => ChangeEvent::Added,
        EventKind::Remove(_) => ChangeEvent::Removed,
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => ChangeEvent::Changed,
        EventKind::Access(_) => return Vec::new(),
    };

    event
        .paths
        .into_iter()
        .filter(|path| is_relevant_path(root, path))
        .map(make)
        .collect()
}
