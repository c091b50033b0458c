use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marker for "all work submitted before this point has been consumed".
///
/// Ids increase monotonically per backend, so reaching a point implies every
/// earlier point has been reached too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyncPoint(u64);

impl SyncPoint {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Issues sync points and tracks the newest one the GPU side has reached.
#[derive(Debug, Default)]
pub struct SyncTimeline {
    issued: u64,
    completed: Arc<AtomicU64>,
}

impl SyncTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> SyncPoint {
        self.issued += 1;
        SyncPoint(self.issued)
    }

    /// Newest point issued so far.
    pub fn last_issued(&self) -> Option<SyncPoint> {
        (self.issued > 0).then_some(SyncPoint(self.issued))
    }

    pub fn reached(&self, point: SyncPoint) -> bool {
        self.completed.load(Ordering::Acquire) >= point.0
    }

    /// Handle that marks points complete, usable from a completion callback.
    pub fn completer(&self) -> SyncCompleter {
        SyncCompleter(self.completed.clone())
    }
}

/// Completion side of a [`SyncTimeline`]; cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct SyncCompleter(Arc<AtomicU64>);

impl SyncCompleter {
    pub fn complete(&self, point: SyncPoint) {
        self.0.fetch_max(point.0, Ordering::AcqRel);
    }
}
