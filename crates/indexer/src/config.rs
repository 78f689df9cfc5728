use std::time::Duration;

/// Tunables shared by the batch and incremental paths.
#[derive(Debug, Clone)]
pub struct IndexingConfig {
    /// Files larger than this are skipped without chunking.
    pub max_file_size_bytes: u64,
    /// Chunker output beyond this count is truncated per file.
    pub max_chunks_per_file: usize,
    /// Chunk count that triggers a batch flush during a full scan.
    pub batch_size: usize,
    /// Quiet period after the last change event for a path before its
    /// index/delete operation runs.
    pub quiet_period: Duration,
    /// Bounded wait for an already-firing task when stopping the
    /// incremental indexer.
    pub stop_grace: Duration,
    /// Capacity of the change-event channel.
    pub event_channel_capacity: usize,
    /// Poll interval for notify backends that fall back to polling.
    pub notify_poll_interval: Duration,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 500_000,
            max_chunks_per_file: 100,
            batch_size: 20,
            quiet_period: Duration::from_millis(2000),
            stop_grace: Duration::from_secs(5),
            event_channel_capacity: 1024,
            notify_poll_interval: Duration::from_secs(2),
        }
    }
}
