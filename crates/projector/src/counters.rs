//! Success and error totals for the processor.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic processed/error totals, owned by the processor and shared
/// read-only with observability surfaces.
///
/// Counters start at zero, only grow, and reset only with the process.
/// Increments are atomic so concurrent partition workers never lose a
/// count; reads never block a worker.
#[derive(Debug, Default)]
pub struct ProcessorCounters {
    processed: AtomicU64,
    errors: AtomicU64,
}

impl ProcessorCounters {
    /// Creates counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successfully applied (or benignly skipped) record.
    pub fn record_success(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one failed record.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Total records processed successfully since process start.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Total records that failed since process start.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}
