use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Discrete file-change notification from the workspace.
///
/// Delivery order within one notification batch is the source's natural
/// traversal order; no global ordering across batches is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Added(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
}

impl ChangeEvent {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Added(p) | Self::Changed(p) | Self::Removed(p) => p,
        }
    }

    #[must_use]
    pub fn is_removal(&self) -> bool {
        matches!(self, Self::Removed(_))
    }
}

/// Bounded channel between a change-event source and the incremental
/// indexer's coalescing logic.
#[must_use]
pub fn change_channel(capacity: usize) -> (mpsc::Sender<ChangeEvent>, mpsc::Receiver<ChangeEvent>) {
    mpsc::channel(capacity)
}
