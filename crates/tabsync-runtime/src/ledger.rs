//! Sync ledger - what this client last pushed
//!
//! The ledger remembers the capture time, fingerprint and window of the last
//! snapshot this client pushed. It drives two decisions:
//! - dirty: the local workspace changed since the last push
//! - pull: the remote moved on, or this client now runs in another window

use tabsync_core::{Fingerprint, Snapshot, Timestamp, WindowId};

/// Record of the last successful push
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncLedger {
    pub last_synced: Option<Timestamp>,
    pub last_fingerprint: Option<Fingerprint>,
    pub last_window: Option<WindowId>,
}

impl SyncLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pushed snapshot
    pub fn record(&mut self, pushed: &Snapshot, window: WindowId) {
        self.last_synced = Some(pushed.captured_at);
        self.last_fingerprint = Some(Fingerprint::of(pushed));
        self.last_window = Some(window);
    }

    /// Forget everything; the next cycle pulls unconditionally
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True if `current` differs from the last push. A client that never
    /// pushed is always dirty.
    pub fn is_dirty(&self, current: &Fingerprint) -> bool {
        self.last_fingerprint.as_ref() != Some(current)
    }

    /// True if the remote replica has to be pulled before pushing
    pub fn needs_pull(&self, remote_captured_at: Timestamp, window: WindowId) -> bool {
        match self.last_synced {
            None => true,
            Some(synced) => synced < remote_captured_at || self.last_window != Some(window),
        }
    }
}
