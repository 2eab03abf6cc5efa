//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Total emit calls
    emit_count: AtomicU64,
    /// Listener invocations that started running
    delivered_count: AtomicU64,
    /// Listeners passed over because their signature did not match
    skipped_count: AtomicU64,
    /// Listener invocations that panicked
    panic_count: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Relaxed)
    }

    pub fn inc_emit_count(&self) {
        self.emit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    pub fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped_count(&self) -> u64 {
        self.skipped_count.load(Ordering::Relaxed)
    }

    pub fn add_skipped_count(&self, n: u64) {
        self.skipped_count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn panic_count(&self) -> u64 {
        self.panic_count.load(Ordering::Relaxed)
    }

    pub fn inc_panic_count(&self) {
        self.panic_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            emit_count: self.emit_count(),
            delivered_count: self.delivered_count(),
            skipped_count: self.skipped_count(),
            panic_count: self.panic_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub emit_count: u64,
    pub delivered_count: u64,
    pub skipped_count: u64,
    pub panic_count: u64,
}
