use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the dispatcher and its running invocations.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    published: AtomicU64,
    scheduled: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time view of dispatcher activity.
///
/// `succeeded + failed` can trail `scheduled` while invocations are still
/// running; cancelled invocations are never counted as either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Number of `publish` calls, including those that found no subscribers.
    pub published: u64,
    /// Number of handler invocations spawned.
    pub scheduled: u64,
    pub succeeded: u64,
    /// Failed invocations, including ones that could not be scheduled.
    pub failed: u64,
}

impl StatsCounters {
    pub(crate) fn record_publish(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scheduled(&self) {
        self.scheduled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            published: self.published.load(Ordering::Relaxed),
            scheduled: self.scheduled.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
