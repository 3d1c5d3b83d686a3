//! Sync client - one reconciliation cycle at a time
//!
//! `synchronize` either pushes the local replica or reports the diff a pull
//! would apply. Pulls are confirmed by the caller: `pull` applies the diff,
//! waits for convergence, then pushes the re-captured replica so the remote
//! learns the identifiers the live system assigned.

use tabsync_core::{
    Fingerprint, LiveOp, Snapshot, SnapshotSummary, SyncError, SyncResult, Timestamp, WindowId,
};
use tabsync_diff::{diff_snapshots, SnapshotDiff};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    ApplyReport, ExecutorConfig, LiveSystem, OverrideSignal, Reconciler, RemoteStore,
    SnapshotSource, SyncLedger, WaitOutcome, WaitProgress,
};

/// Local state as seen by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncStatus {
    pub summary: SnapshotSummary,
    /// Local workspace changed since the last push
    pub dirty: bool,
    pub last_synced: Option<Timestamp>,
}

/// Result of `synchronize`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncDecision {
    /// Local replica pushed
    Pushed(SnapshotSummary),
    /// Remote is ahead; applying this diff would bring the local replica to it
    PullRequired(SnapshotDiff),
}

/// Result of `pull`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullReport {
    pub apply: ApplyReport,
    pub wait: WaitOutcome,
    /// Summary of the re-captured replica that was pushed
    pub summary: SnapshotSummary,
}

/// Drives sync cycles between one live workspace and one remote store
pub struct SyncClient<L, R>
where
    L: LiveSystem + SnapshotSource,
    R: RemoteStore,
{
    live: L,
    remote: R,
    ledger: SyncLedger,
    config: ExecutorConfig,
}

impl<L, R> SyncClient<L, R>
where
    L: LiveSystem + SnapshotSource,
    R: RemoteStore,
{
    pub fn new(live: L, remote: R, config: ExecutorConfig) -> Self {
        Self::with_ledger(live, remote, config, SyncLedger::new())
    }

    /// Resume with a ledger persisted from an earlier session
    pub fn with_ledger(live: L, remote: R, config: ExecutorConfig, ledger: SyncLedger) -> Self {
        SyncClient {
            live,
            remote,
            ledger,
            config,
        }
    }

    pub fn live(&self) -> &L {
        &self.live
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn ledger(&self) -> &SyncLedger {
        &self.ledger
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub async fn status(&self) -> SyncResult<SyncStatus> {
        let local = self.live.capture_local().await?;
        Ok(SyncStatus {
            summary: local.summary(),
            dirty: self.ledger.is_dirty(&Fingerprint::of(&local)),
            last_synced: self.ledger.last_synced,
        })
    }

    /// Push the local replica, or return the diff to pull if the remote is
    /// ahead of the ledger or the window changed
    pub async fn synchronize(&mut self) -> SyncResult<SyncDecision> {
        let local = self.live.capture_local().await?;
        let window = self.window().await?;

        let fetched = self.remote.fetch().await?;
        let remote = match fetched {
            Some(remote) if self.ledger.needs_pull(remote.captured_at, window) => remote,
            _ => {
                let summary = self.push(&local, window).await?;
                return Ok(SyncDecision::Pushed(summary));
            }
        };

        let diff = diff_snapshots(&local, &remote)?;
        info!(%diff, remote_captured_at = %remote.captured_at, "pull required");
        Ok(SyncDecision::PullRequired(diff))
    }

    /// Apply a confirmed diff, wait for the live system to settle, then push
    /// the re-captured replica
    pub async fn pull(
        &mut self,
        diff: SnapshotDiff,
        signal: OverrideSignal,
        progress: Option<&watch::Sender<WaitProgress>>,
    ) -> SyncResult<PullReport> {
        let reconciler = Reconciler::new(&self.live, self.config.clone());
        let apply = reconciler.apply(diff).await?;
        let wait = reconciler.wait_for_convergence(signal, progress).await?;
        if let WaitOutcome::Overridden { remaining } = wait {
            warn!(remaining, "pushing before every item finished loading");
        }

        let recaptured = self.live.capture_local().await?;
        let window = self.window().await?;
        let summary = self.push(&recaptured, window).await?;

        Ok(PullReport {
            apply,
            wait,
            summary,
        })
    }

    /// Push the local replica regardless of the remote state
    pub async fn force_push(&mut self) -> SyncResult<SnapshotSummary> {
        let local = self.live.capture_local().await?;
        let window = self.window().await?;
        self.push(&local, window).await
    }

    pub fn reset_ledger(&mut self) {
        info!("sync ledger reset");
        self.ledger.reset();
    }

    async fn window(&self) -> SyncResult<WindowId> {
        self.live
            .current_window()
            .await
            .map_err(|f| SyncError::live(LiveOp::CurrentWindow, "current window", f))
    }

    async fn push(&mut self, snapshot: &Snapshot, window: WindowId) -> SyncResult<SnapshotSummary> {
        self.remote.push(snapshot).await?;
        self.ledger.record(snapshot, window);
        let summary = snapshot.summary();
        info!(%summary, captured_at = %snapshot.captured_at, "snapshot pushed");
        Ok(summary)
    }
}
