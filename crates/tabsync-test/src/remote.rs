//! In-memory remote store

use std::sync::Arc;

use parking_lot::Mutex;

use tabsync_core::{Snapshot, SyncError, SyncResult};
use tabsync_runtime::RemoteStore;

#[derive(Default)]
struct RemoteState {
    latest: Option<Snapshot>,
    pushes: usize,
    fail_fetch: bool,
    fail_push: bool,
}

/// Single-record remote replica. Clones share the record, so several
/// simulated clients can sync against one store.
#[derive(Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` without going through a client
    pub fn seed(&self, snapshot: Snapshot) {
        self.state.lock().latest = Some(snapshot);
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.state.lock().latest.clone()
    }

    /// Successful pushes so far
    pub fn push_count(&self) -> usize {
        self.state.lock().pushes
    }

    pub fn fail_next_fetch(&self) {
        self.state.lock().fail_fetch = true;
    }

    pub fn fail_next_push(&self) {
        self.state.lock().fail_push = true;
    }
}

impl RemoteStore for MemoryRemote {
    async fn fetch(&self) -> SyncResult<Option<Snapshot>> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_fetch) {
            return Err(SyncError::Remote("fetch unavailable".into()));
        }
        Ok(state.latest.clone())
    }

    async fn push(&self, snapshot: &Snapshot) -> SyncResult<()> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_push) {
            return Err(SyncError::Remote("push rejected".into()));
        }
        state.latest = Some(snapshot.clone());
        state.pushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsync_core::{ItemId, Timestamp};

    #[tokio::test]
    async fn test_push_replaces_record() {
        let remote = MemoryRemote::new();
        assert!(remote.fetch().await.unwrap().is_none());

        let first = Snapshot::new(Timestamp::from_millis(1)).with_item(ItemId::new(1), "https://a.example");
        let second = Snapshot::new(Timestamp::from_millis(2));
        remote.push(&first).await.unwrap();
        remote.clone().push(&second).await.unwrap();

        assert_eq!(remote.fetch().await.unwrap(), Some(second));
        assert_eq!(remote.push_count(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures_fire_once() {
        let remote = MemoryRemote::new();
        remote.fail_next_fetch();
        remote.fail_next_push();

        assert!(matches!(remote.fetch().await, Err(SyncError::Remote(_))));
        assert!(remote.fetch().await.is_ok());

        let snapshot = Snapshot::new(Timestamp::from_millis(1));
        assert!(remote.push(&snapshot).await.is_err());
        assert!(remote.push(&snapshot).await.is_ok());
        assert_eq!(remote.push_count(), 1);
    }
}
