use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use serde::{Serialize, Deserialize};

/// Engine counters. Clones share the same underlying atomics.
#[derive(Clone, Default)]
pub struct EngineMetrics {
    /// Backlog snapshots computed
    pub backlog_computations: Arc<AtomicU64>,
    /// Calendar days walked by backlog computations (sum)
    pub backlog_days_iterated: Arc<AtomicU64>,
    pub reorders: Arc<AtomicU64>,
    pub task_writes_ok: Arc<AtomicU64>,
    pub task_writes_failed: Arc<AtomicU64>,
    pub progress_cache_hits: Arc<AtomicU64>,
    pub progress_cache_misses: Arc<AtomicU64>,
    /// Progress cache drops caused by another device's write
    pub remote_invalidations: Arc<AtomicU64>,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub backlog_computations: u64,
    pub backlog_days_iterated: u64,
    pub reorders: u64,
    pub task_writes_ok: u64,
    pub task_writes_failed: u64,
    pub progress_cache_hits: u64,
    pub progress_cache_misses: u64,
    pub remote_invalidations: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_backlog(&self, days_iterated: u64) {
        self.backlog_computations.fetch_add(1, Ordering::Relaxed);
        self.backlog_days_iterated.fetch_add(days_iterated, Ordering::Relaxed);
    }

    pub fn record_reorder(&self, writes_ok: u64, writes_failed: u64) {
        self.reorders.fetch_add(1, Ordering::Relaxed);
        self.task_writes_ok.fetch_add(writes_ok, Ordering::Relaxed);
        self.task_writes_failed.fetch_add(writes_failed, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.progress_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.progress_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_invalidation(&self) {
        self.remote_invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            backlog_computations: self.backlog_computations.load(Ordering::Relaxed),
            backlog_days_iterated: self.backlog_days_iterated.load(Ordering::Relaxed),
            reorders: self.reorders.load(Ordering::Relaxed),
            task_writes_ok: self.task_writes_ok.load(Ordering::Relaxed),
            task_writes_failed: self.task_writes_failed.load(Ordering::Relaxed),
            progress_cache_hits: self.progress_cache_hits.load(Ordering::Relaxed),
            progress_cache_misses: self.progress_cache_misses.load(Ordering::Relaxed),
            remote_invalidations: self.remote_invalidations.load(Ordering::Relaxed),
        }
    }
}
