//! Snapshot capture and remote storage seams

use tabsync_core::{Snapshot, SyncResult};

/// Produces a full capture of the local workspace
#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    async fn capture_local(&self) -> SyncResult<Snapshot>;
}

/// Stores the single shared remote replica
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Latest remote snapshot, or `None` if nothing was ever pushed
    async fn fetch(&self) -> SyncResult<Option<Snapshot>>;

    /// Replace the remote replica
    async fn push(&self, snapshot: &Snapshot) -> SyncResult<()>;
}
